use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::File;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use workorder_triage::config::AppConfig;
use workorder_triage::dashboard::{
    aggregate_kpis, build_inbox, KpiMetrics, PriorityItem, UrgencyScorer, WorkOrder,
};
use workorder_triage::error::AppError;
use workorder_triage::ingest::{parse_work_orders, IngestOutcome, InvalidDateInput};
use workorder_triage::telemetry;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    scorer: Arc<UrgencyScorer>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Work-Order Triage",
    about = "Serve and demo the work-order priority inbox and KPI snapshot",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Build dashboard views from a work-order export
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum DashboardCommand {
    /// Print the priority inbox and KPI snapshot for a CSV export
    Report(DashboardReportArgs),
}

#[derive(Args, Debug)]
struct DashboardReportArgs {
    /// Work-order CSV export to triage
    #[arg(long)]
    csv: PathBuf,
    /// Evaluation instant as YYYY-MM-DD (defaults to the current UTC time)
    #[arg(long, value_parser = parse_date)]
    now: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct DashboardRequest {
    /// Evaluation instant; the service clock is used when omitted.
    #[serde(default)]
    now: Option<DateTime<Utc>>,
    #[serde(default)]
    work_orders: Option<Vec<WorkOrder>>,
    #[serde(default)]
    csv: Option<String>,
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    now: DateTime<Utc>,
    data_source: DashboardDataSource,
    rejected_records: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rejected: Vec<InvalidDateInput>,
    inbox: Vec<PriorityItem>,
    metrics: KpiMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum DashboardDataSource {
    Csv,
    Records,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Dashboard {
            command: DashboardCommand::Report(args),
        } => run_dashboard_report(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        scorer: Arc::new(UrgencyScorer::new(config.weights.clone())),
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/dashboard", post(dashboard_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "work-order triage service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_dashboard_report(args: DashboardReportArgs) -> Result<(), AppError> {
    let DashboardReportArgs { csv, now } = args;

    let now = match now {
        Some(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now),
        None => Utc::now(),
    };

    let config = AppConfig::load()?;
    let file = File::open(csv)?;
    let outcome = parse_work_orders(file)?;
    let scorer = UrgencyScorer::new(config.weights);
    let inbox = build_inbox(&outcome.orders, &scorer, now);
    let metrics = aggregate_kpis(&outcome.orders, now);

    render_dashboard(&outcome, &inbox, &metrics, now);
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn dashboard_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<DashboardRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    build_dashboard(&state.scorer, payload).map(Json)
}

fn build_dashboard(
    scorer: &UrgencyScorer,
    payload: DashboardRequest,
) -> Result<DashboardResponse, AppError> {
    let DashboardRequest {
        now,
        work_orders,
        csv,
    } = payload;

    let (outcome, data_source) = if let Some(csv) = csv {
        let reader = Cursor::new(csv.into_bytes());
        (parse_work_orders(reader)?, DashboardDataSource::Csv)
    } else {
        let outcome = IngestOutcome {
            orders: work_orders.unwrap_or_default(),
            rejected: Vec::new(),
        };
        (outcome, DashboardDataSource::Records)
    };

    // The only place ambient time enters; every computation below receives
    // this instant explicitly.
    let now = now.unwrap_or_else(Utc::now);
    let inbox = build_inbox(&outcome.orders, scorer, now);
    let metrics = aggregate_kpis(&outcome.orders, now);

    Ok(DashboardResponse {
        now,
        data_source,
        rejected_records: outcome.rejected.len(),
        rejected: outcome.rejected,
        inbox,
        metrics,
    })
}

fn render_dashboard(
    outcome: &IngestOutcome,
    inbox: &[PriorityItem],
    metrics: &KpiMetrics,
    now: DateTime<Utc>,
) {
    println!("Work-order triage report (evaluated {now})");
    println!(
        "Records: {} accepted, {} rejected",
        outcome.orders.len(),
        outcome.rejected.len()
    );

    for rejected in &outcome.rejected {
        println!("- excluded: {rejected}");
    }

    println!("\nKPI snapshot");
    println!("- Due today: {}", metrics.due_today);
    println!("- Overdue: {}", metrics.overdue);
    println!("- Critical open: {}", metrics.critical);
    println!("- Avg completion: {} days", metrics.avg_completion_days);
    println!("- On-time rate: {}%", metrics.on_time_rate);
    println!("- Closure rate: {}%", metrics.closure_rate);
    println!("- Weekly trend: {}%", metrics.weekly_trend);

    if inbox.is_empty() {
        println!("\nPriority inbox: empty");
        return;
    }

    println!("\nPriority inbox");
    for item in inbox {
        let impact_note = if item.property_impacting {
            " [property impact]"
        } else {
            ""
        };
        println!(
            "- [{}] {} | {} | {} | due {} | {}{}",
            item.urgency_score,
            item.id,
            item.title,
            item.property,
            item.due_label,
            item.status_label,
            impact_note
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use workorder_triage::dashboard::UrgencyWeights;

    const CSV: &str = "ID,Title,Property,Priority,Status,Category,Created Date,Due Date,Completed Date\n\
        wo-1,Gas smell in basement,Riverside Commons,Critical,Open,Emergency,2025-06-08,2025-06-08,\n\
        wo-2,Touch up hallway paint,Riverside Commons,Low,Open,Cosmetic,2025-06-01,2025-07-20,\n\
        wo-3,Replace lobby bulbs,Riverside Commons,Low,Completed,Electrical,2025-06-01,2025-06-05,2025-06-04\n\
        wo-4,Mystery row,Riverside Commons,Low,Open,Misc,not-a-date,2025-06-20,\n";

    fn evaluation_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0)
            .single()
            .expect("valid datetime")
    }

    #[test]
    fn dashboard_triages_csv_payloads() {
        let request = DashboardRequest {
            now: Some(evaluation_instant()),
            work_orders: None,
            csv: Some(CSV.to_string()),
        };

        let body = build_dashboard(&UrgencyScorer::default(), request)
            .expect("dashboard builds");

        assert_eq!(body.data_source, DashboardDataSource::Csv);
        assert_eq!(body.rejected_records, 1);
        assert_eq!(body.inbox.len(), 2);
        assert_eq!(body.inbox[0].id, "wo-1");
        assert_eq!(body.inbox[0].urgency_score, 10);
        assert_eq!(body.metrics.overdue, 1);
        // One completed order out of three accepted, rounded to one decimal.
        assert_eq!(body.metrics.closure_rate, 33.3);
    }

    #[test]
    fn dashboard_defaults_to_empty_record_set() {
        let request = DashboardRequest {
            now: Some(evaluation_instant()),
            work_orders: None,
            csv: None,
        };

        let body = build_dashboard(&UrgencyScorer::default(), request)
            .expect("dashboard builds");

        assert_eq!(body.data_source, DashboardDataSource::Records);
        assert!(body.inbox.is_empty());
        assert_eq!(body.metrics.closure_rate, 0.0);
    }

    #[test]
    fn configured_weight_table_drives_the_scorer() {
        let lenient = UrgencyWeights {
            ceiling: 5,
            ..UrgencyWeights::default()
        };
        let request = DashboardRequest {
            now: Some(evaluation_instant()),
            work_orders: None,
            csv: Some(CSV.to_string()),
        };

        let body = build_dashboard(&UrgencyScorer::new(lenient), request)
            .expect("dashboard builds");

        // wo-1 sums to 12 under the default table; the lowered ceiling caps it.
        assert_eq!(body.inbox[0].id, "wo-1");
        assert_eq!(body.inbox[0].urgency_score, 5);
    }
}

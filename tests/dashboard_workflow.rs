use chrono::{DateTime, Duration, TimeZone, Utc};
use std::io::Cursor;
use workorder_triage::dashboard::{
    aggregate_kpis, build_inbox, Priority, UrgencyScorer, WorkOrder, WorkOrderStatus,
};
use workorder_triage::ingest::parse_work_orders;

fn evaluation_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0)
        .single()
        .expect("valid evaluation instant")
}

fn order(id: &str, priority: Priority, status: WorkOrderStatus, due_in_days: i64) -> WorkOrder {
    let now = evaluation_instant();
    WorkOrder {
        id: id.to_string(),
        title: format!("Work order {id}"),
        property: "Riverside Commons".to_string(),
        priority,
        status,
        category: "Service Request".to_string(),
        created_date: now - Duration::days(14),
        due_date: Some(now + Duration::days(due_in_days)),
        completed_date: None,
    }
}

#[test]
fn csv_export_flows_into_both_dashboard_views() {
    let csv = "ID,Title,Property,Priority,Status,Category,Created Date,Due Date,Completed Date\n\
        wo-1,Gas smell in basement,Riverside Commons,Critical,Open,Emergency,2025-06-08,2025-06-08,\n\
        wo-2,Dripping faucet,Riverside Commons,Medium,On Hold,Plumbing,2025-06-01,2025-06-11,\n\
        wo-3,Quarterly filter swap,Riverside Commons,Low,Open,Routine,2025-06-01,2025-07-15,\n\
        wo-4,Replace lobby bulbs,Riverside Commons,Low,Completed,Electrical,2025-06-02,2025-06-09,2025-06-05\n";

    let outcome = parse_work_orders(Cursor::new(csv.as_bytes())).expect("export parses");
    assert!(outcome.rejected.is_empty());
    assert_eq!(outcome.orders.len(), 4);

    let now = evaluation_instant();
    let inbox = build_inbox(&outcome.orders, &UrgencyScorer::default(), now);

    // Completed wo-4 drops out; the rest rank by urgency.
    let ids: Vec<&str> = inbox.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, ["wo-1", "wo-2", "wo-3"]);
    assert_eq!(inbox[0].urgency_score, 10);
    assert!(inbox[0].property_impacting);
    assert_eq!(inbox[0].due_label, "2 days overdue");
    assert_eq!(inbox[1].due_label, "Tomorrow");

    let metrics = aggregate_kpis(&outcome.orders, now);
    assert_eq!(metrics.overdue, 1);
    assert_eq!(metrics.critical, 1);
    assert_eq!(metrics.closure_rate, 25.0);
    // wo-4 completed four days before its due date.
    assert_eq!(metrics.on_time_rate, 100.0);
    assert_eq!(metrics.avg_completion_days, 3.0);
}

#[test]
fn malformed_dates_are_reported_and_never_aggregated() {
    let csv = "ID,Title,Property,Priority,Status,Category,Created Date,Due Date,Completed Date\n\
        wo-1,Broken intercom,Riverside Commons,High,Open,Electrical,06/01/2025,2025-06-12,\n\
        wo-2,Stuck gate,Riverside Commons,High,Open,Access,2025-06-01,2025-06-12,\n";

    let outcome = parse_work_orders(Cursor::new(csv.as_bytes())).expect("export parses");

    assert_eq!(outcome.orders.len(), 1);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].id, "wo-1");
    assert_eq!(outcome.rejected[0].field, "created date");
    assert_eq!(outcome.rejected[0].value, "06/01/2025");

    let metrics = aggregate_kpis(&outcome.orders, evaluation_instant());
    assert_eq!(metrics.closure_rate, 0.0);
    assert_eq!(metrics.critical, 0);
}

#[test]
fn inbox_scores_stay_bounded_and_stable_across_a_mixed_backlog() {
    let now = evaluation_instant();
    let mut orders = vec![
        order("a", Priority::Critical, WorkOrderStatus::Open, -10),
        order("b", Priority::High, WorkOrderStatus::OnHold, 0),
        order("c", Priority::Medium, WorkOrderStatus::InProgress, 2),
        order("d", Priority::Low, WorkOrderStatus::Open, 40),
        order("e", Priority::Low, WorkOrderStatus::Completed, -5),
    ];
    // Two records engineered to tie: both score 3 + 2 (due in two days).
    orders.push(order("tie-one", Priority::High, WorkOrderStatus::Open, 2));
    orders.push(order("tie-two", Priority::High, WorkOrderStatus::Open, 2));

    let inbox = build_inbox(&orders, &UrgencyScorer::default(), now);

    assert!(inbox.iter().all(|item| item.status != WorkOrderStatus::Completed));
    assert!(inbox.iter().all(|item| (1..=10).contains(&item.urgency_score)));
    assert!(inbox
        .windows(2)
        .all(|pair| pair[0].urgency_score >= pair[1].urgency_score));

    let tie_positions: Vec<usize> = inbox
        .iter()
        .enumerate()
        .filter(|(_, item)| item.id.starts_with("tie-"))
        .map(|(idx, _)| idx)
        .collect();
    assert_eq!(tie_positions.len(), 2);
    assert_eq!(inbox[tie_positions[0]].id, "tie-one");
    assert_eq!(inbox[tie_positions[1]].id, "tie-two");
    assert_eq!(tie_positions[1], tie_positions[0] + 1);
}

#[test]
fn kpi_snapshot_handles_quiet_weeks_without_a_baseline() {
    let now = evaluation_instant();
    let mut finished_this_week = order("f", Priority::Medium, WorkOrderStatus::Completed, 5);
    finished_this_week.completed_date = Some(now - Duration::days(2));

    let metrics = aggregate_kpis(&[finished_this_week], now);
    assert_eq!(metrics.weekly_trend, 0.0);
    assert_eq!(metrics.closure_rate, 100.0);
}

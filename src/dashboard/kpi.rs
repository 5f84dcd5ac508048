use super::domain::{ceil_days, Priority, WorkOrder};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Aggregate performance snapshot behind the dashboard KPI row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiMetrics {
    pub due_today: usize,
    pub overdue: usize,
    pub critical: usize,
    /// Mean days from creation to completion, one decimal.
    pub avg_completion_days: f64,
    /// Percentage of completed orders finished on or before their due date.
    pub on_time_rate: f64,
    /// Percentage of all tracked orders that reached Completed.
    pub closure_rate: f64,
    /// Percentage change in completion volume, last 7 days vs the 7 before.
    pub weekly_trend: f64,
}

/// Reduces the full record set to a fresh [`KpiMetrics`] snapshot. Nothing
/// is cached or updated incrementally; callers re-run this per refresh.
pub fn aggregate_kpis(orders: &[WorkOrder], now: DateTime<Utc>) -> KpiMetrics {
    let today = now.date_naive();

    let mut due_today = 0;
    let mut overdue = 0;
    let mut critical = 0;
    for order in orders.iter().filter(|order| !order.status.is_terminal()) {
        if order.priority == Priority::Critical {
            critical += 1;
        }
        if let Some(due) = order.due_date {
            if due.date_naive() == today {
                due_today += 1;
            }
            if due < now {
                overdue += 1;
            }
        }
    }

    // Completion metrics only consider orders that both reached Completed
    // and carry a completion timestamp.
    let completed: Vec<(&WorkOrder, DateTime<Utc>)> = orders
        .iter()
        .filter(|order| order.status.is_terminal())
        .filter_map(|order| order.completed_date.map(|finished| (order, finished)))
        .collect();

    let avg_completion_days = if completed.is_empty() {
        0.0
    } else {
        let total_days: i64 = completed
            .iter()
            .map(|(order, finished)| ceil_days(order.created_date, *finished))
            .sum();
        round1(total_days as f64 / completed.len() as f64)
    };

    let on_time_rate = if completed.is_empty() {
        0.0
    } else {
        // A completed order without a due date counts as on time.
        let on_time = completed
            .iter()
            .filter(|(order, finished)| order.due_date.map_or(true, |due| *finished <= due))
            .count();
        round1(on_time as f64 * 100.0 / completed.len() as f64)
    };

    let week_ago = now - Duration::days(7);
    let fortnight_ago = now - Duration::days(14);
    let this_week = completed
        .iter()
        .filter(|(_, finished)| *finished >= week_ago && *finished < now)
        .count();
    let prior_week = completed
        .iter()
        .filter(|(_, finished)| *finished >= fortnight_ago && *finished < week_ago)
        .count();

    // No completions in the earlier window means no baseline; the trend is
    // 0 by contract rather than a division error.
    let weekly_trend = if prior_week == 0 {
        0.0
    } else {
        round1((this_week as f64 - prior_week as f64) * 100.0 / prior_week as f64)
    };

    let closure_rate = if orders.is_empty() {
        0.0
    } else {
        let closed = orders.iter().filter(|order| order.status.is_terminal()).count();
        round1(closed as f64 * 100.0 / orders.len() as f64)
    };

    KpiMetrics {
        due_today,
        overdue,
        critical,
        avg_completion_days,
        on_time_rate,
        closure_rate,
        weekly_trend,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

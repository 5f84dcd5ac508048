use super::domain::{Priority, WorkOrder, WorkOrderStatus};
use super::due::format_relative;
use super::scoring::UrgencyScorer;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One entry on the priority-inbox widget, rebuilt from scratch on every
/// call and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct PriorityItem {
    pub id: String,
    pub title: String,
    pub property: String,
    pub due_label: String,
    pub priority: Priority,
    pub priority_label: &'static str,
    pub status: WorkOrderStatus,
    pub status_label: &'static str,
    pub urgency_score: u8,
    pub property_impacting: bool,
}

/// Filters out completed orders, scores the rest, and returns them most
/// urgent first. The sort is stable: orders with equal scores keep their
/// input order so repeated builds over the same data agree.
pub fn build_inbox(
    orders: &[WorkOrder],
    scorer: &UrgencyScorer,
    now: DateTime<Utc>,
) -> Vec<PriorityItem> {
    let mut items: Vec<PriorityItem> = orders
        .iter()
        .filter(|order| !order.status.is_terminal())
        .map(|order| {
            let property_impacting = order.is_property_impacting();
            let urgency_score = scorer.score(order, property_impacting, now);
            let due_label = order
                .due_date
                .map(|due| format_relative(due, now))
                .unwrap_or_else(|| "No due date".to_string());

            PriorityItem {
                id: order.id.clone(),
                title: order.title.clone(),
                property: order.property.clone(),
                due_label,
                priority: order.priority,
                priority_label: order.priority.label(),
                status: order.status,
                status_label: order.status.label(),
                urgency_score,
                property_impacting,
            }
        })
        .collect();

    items.sort_by(|a, b| b.urgency_score.cmp(&a.urgency_score));
    items
}

pub mod domain;
pub mod due;
pub mod inbox;
pub mod kpi;
pub mod scoring;

pub use domain::{Priority, WorkOrder, WorkOrderStatus};
pub use due::format_relative;
pub use inbox::{build_inbox, PriorityItem};
pub use kpi::{aggregate_kpis, KpiMetrics};
pub use scoring::{UrgencyScorer, UrgencyWeights};

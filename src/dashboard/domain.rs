use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Maps a free-form dataset label onto a priority. Unrecognized labels
    /// fall back to `Low`, matching how downstream scoring treats them.
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Open,
    InProgress,
    OnHold,
    Completed,
}

impl WorkOrderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::OnHold => "On Hold",
            Self::Completed => "Completed",
        }
    }

    /// Maps a free-form dataset label onto a status. Unrecognized labels are
    /// treated as `Open` so they stay visible in the inbox.
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "closed" => Self::Completed,
            "in progress" => Self::InProgress,
            "on hold" => Self::OnHold,
            _ => Self::Open,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// One work-order record as supplied by the facility-management dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,
    pub title: String,
    pub property: String,
    pub priority: Priority,
    pub status: WorkOrderStatus,
    pub category: String,
    pub created_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
}

impl WorkOrder {
    /// Emergency-category and critical-priority orders affect facility
    /// operations broadly and earn the impact bonus during scoring.
    pub fn is_property_impacting(&self) -> bool {
        self.category == "Emergency" || self.priority == Priority::Critical
    }
}

const SECS_PER_DAY: i64 = 86_400;

/// Whole-day difference from `from` to `to`, rounded up so any partial day
/// counts as a full one. Negative when `to` precedes `from` by a day or more.
pub(crate) fn ceil_days(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let secs = (to - from).num_seconds();
    (secs + SECS_PER_DAY - 1).div_euclid(SECS_PER_DAY)
}

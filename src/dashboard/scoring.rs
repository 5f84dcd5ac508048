use super::domain::{ceil_days, Priority, WorkOrder, WorkOrderStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Tunable weight table behind the urgency heuristic. Keeping every factor
/// named here keeps the policy auditable and testable per factor; partial
/// overrides (e.g. from `TRIAGE_URGENCY_WEIGHTS`) merge onto the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UrgencyWeights {
    pub critical_base: u8,
    pub high_base: u8,
    pub medium_base: u8,
    pub low_base: u8,
    pub overdue_bonus: u8,
    pub due_today_bonus: u8,
    pub due_tomorrow_bonus: u8,
    pub due_soon_bonus: u8,
    pub property_impact_bonus: u8,
    pub on_hold_penalty: u8,
    pub ceiling: u8,
}

impl Default for UrgencyWeights {
    fn default() -> Self {
        Self {
            critical_base: 4,
            high_base: 3,
            medium_base: 2,
            low_base: 1,
            overdue_bonus: 6,
            due_today_bonus: 5,
            due_tomorrow_bonus: 3,
            due_soon_bonus: 2,
            property_impact_bonus: 2,
            on_hold_penalty: 1,
            ceiling: 10,
        }
    }
}

impl UrgencyWeights {
    const fn priority_base(&self, priority: Priority) -> u8 {
        match priority {
            Priority::Critical => self.critical_base,
            Priority::High => self.high_base,
            Priority::Medium => self.medium_base,
            Priority::Low => self.low_base,
        }
    }
}

/// Stateless scorer applying the weight table to one work order at a time.
///
/// The property-impact decision belongs to the caller; the scorer only
/// applies the bonus for a flag it is handed.
#[derive(Debug, Clone, Default)]
pub struct UrgencyScorer {
    weights: UrgencyWeights,
}

impl UrgencyScorer {
    pub fn new(weights: UrgencyWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, order: &WorkOrder, property_impacting: bool, now: DateTime<Utc>) -> u8 {
        let weights = &self.weights;
        let mut total = u16::from(weights.priority_base(order.priority));

        if let Some(due) = order.due_date {
            let days_until = ceil_days(now, due);
            total += u16::from(match days_until {
                d if d < 0 => weights.overdue_bonus,
                0 => weights.due_today_bonus,
                1 => weights.due_tomorrow_bonus,
                2..=3 => weights.due_soon_bonus,
                _ => 0,
            });
        }

        if property_impacting {
            total += u16::from(weights.property_impact_bonus);
        }

        if order.status == WorkOrderStatus::OnHold {
            total += u16::from(weights.on_hold_penalty);
        }

        total.min(u16::from(weights.ceiling)) as u8
    }
}

use crate::dashboard::domain::{Priority, WorkOrder, WorkOrderStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// A work order's date field failed to parse. The record is excluded from
/// every derived view and reported back instead of skewing aggregates.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, thiserror::Error)]
#[error("work order {id}: invalid {field} '{value}'")]
pub struct InvalidDateInput {
    pub id: String,
    pub field: &'static str,
    pub value: String,
}

/// Result of one ingestion pass: accepted orders in input order plus the
/// rows excluded for malformed dates.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub orders: Vec<WorkOrder>,
    pub rejected: Vec<InvalidDateInput>,
}

/// Parses a work-order CSV export, validating every date field up front.
pub fn parse_work_orders<R: Read>(reader: R) -> Result<IngestOutcome, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut outcome = IngestOutcome::default();

    for record in csv_reader.deserialize::<WorkOrderRow>() {
        let row = record?;
        match row.into_order() {
            Ok(order) => outcome.orders.push(order),
            Err(err) => outcome.rejected.push(err),
        }
    }

    Ok(outcome)
}

#[derive(Debug, Deserialize)]
struct WorkOrderRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Property")]
    property: String,
    #[serde(rename = "Priority", default)]
    priority: String,
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "Category", default)]
    category: String,
    #[serde(rename = "Created Date", default, deserialize_with = "empty_string_as_none")]
    created_date: Option<String>,
    #[serde(rename = "Due Date", default, deserialize_with = "empty_string_as_none")]
    due_date: Option<String>,
    #[serde(rename = "Completed Date", default, deserialize_with = "empty_string_as_none")]
    completed_date: Option<String>,
}

impl WorkOrderRow {
    fn into_order(self) -> Result<WorkOrder, InvalidDateInput> {
        let created_date = self
            .created_date
            .as_deref()
            .ok_or_else(|| self.invalid("created date", ""))
            .and_then(|raw| parse_instant(raw).ok_or_else(|| self.invalid("created date", raw)))?;
        let due_date = self.parse_optional("due date", self.due_date.as_deref())?;
        let completed_date = self.parse_optional("completed date", self.completed_date.as_deref())?;

        Ok(WorkOrder {
            id: self.id,
            title: self.title,
            property: self.property,
            priority: Priority::from_label(&self.priority),
            status: WorkOrderStatus::from_label(&self.status),
            category: self.category,
            created_date,
            due_date,
            completed_date,
        })
    }

    fn parse_optional(
        &self,
        field: &'static str,
        raw: Option<&str>,
    ) -> Result<Option<DateTime<Utc>>, InvalidDateInput> {
        match raw {
            None => Ok(None),
            Some(value) => parse_instant(value)
                .map(Some)
                .ok_or_else(|| self.invalid(field, value)),
        }
    }

    fn invalid(&self, field: &'static str, value: &str) -> InvalidDateInput {
        InvalidDateInput {
            id: self.id.clone(),
            field,
            value: value.to_string(),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive: NaiveDateTime| naive.and_utc());
    }

    None
}

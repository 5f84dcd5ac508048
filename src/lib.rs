//! Triage core for facility work orders: a priority inbox and a KPI
//! snapshot, both recomputed from scratch against an explicit "now".

pub mod config;
pub mod dashboard;
pub mod error;
pub mod ingest;
pub mod telemetry;

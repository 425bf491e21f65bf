//! Shared wiring for the `payments-server` and `report-server` binaries.

pub mod config;
pub mod telemetry;

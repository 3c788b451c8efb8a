//! Persisted run state.

pub mod report;

pub use report::{RunReport, REPORT_PATH};

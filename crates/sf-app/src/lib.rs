//! Shared application service layer for stormflow.
//!
//! Compiles projects into runtime networks, runs them, and turns the outcome
//! into serialisable reports for the CLI.

pub mod compile;
pub mod error;
pub mod project_service;
pub mod query;
pub mod run_service;

// Re-export key types for convenience
pub use compile::{CompiledProject, build_grids, build_rainfall, compile_project};
pub use error::{AppError, AppResult};
pub use project_service::{ProjectSummary, load_project, save_project, summarize, validate_project};
pub use query::{export_series_csv, find_link, find_series, parse_series_kind};
pub use run_service::{
    LinkReport, NodeReport, RunReport, SeriesKind, SeriesRecord, run_project, save_report_json,
};

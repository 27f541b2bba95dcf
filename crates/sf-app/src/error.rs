//! Error types for the application layer.

use std::path::PathBuf;

/// Errors surfaced to frontends; backend errors are flattened to messages.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to write {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Runtime compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for sf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<sf_project::ProjectError> for AppError {
    fn from(err: sf_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<sf_sim::SimError> for AppError {
    fn from(err: sf_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

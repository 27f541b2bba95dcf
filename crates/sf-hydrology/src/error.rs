//! Error types for runoff generation.

use sf_core::SfError;
use thiserror::Error;

/// Errors encountered while generating runoff.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunoffError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A depth fell below zero by more than numerical noise.
    #[error("Invalid physical state: {what} = {value}")]
    InvalidPhysicalState { what: &'static str, value: f64 },

    #[error("ODE step size underflow at t={t} (h={step})")]
    StepSizeUnderflow { t: f64, step: f64 },

    #[error("Sub-area routing forms a cycle")]
    CyclicRouting,

    #[error("Sub-area {index} does not exist (len={len})")]
    UnknownSubarea { index: usize, len: usize },

    #[error(transparent)]
    Core(#[from] SfError),
}

pub type RunoffResult<T> = Result<T, RunoffError>;

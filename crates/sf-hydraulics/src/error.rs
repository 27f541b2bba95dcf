//! Error types for link hydraulics and pipe sizing.

use sf_core::error::SfError;
use thiserror::Error;

/// Errors that can occur while sizing or routing a link.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydraulicsError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Required diameter {required_mm:.1} mm exceeds the largest catalog size {largest_mm:.1} mm")]
    OutOfCatalogRange { required_mm: f64, largest_mm: f64 },

    #[error("No sign change of the fill-angle equation below {initial_angle:.4} rad (known={known:.6e})")]
    BracketNotFound { initial_angle: f64, known: f64 },

    #[error("Fill-angle bisection did not converge in {iterations} iterations (last angle {angle:.4} rad)")]
    IterationCap { iterations: usize, angle: f64 },

    #[error("Link geometry is already sized")]
    AlreadySized,

    #[error("Link geometry is not sized yet")]
    NotSized,

    #[error(transparent)]
    Core(#[from] SfError),
}

impl HydraulicsError {
    /// Whether this is a root-finding failure.
    pub fn is_nonconvergence(&self) -> bool {
        matches!(
            self,
            HydraulicsError::BracketNotFound { .. } | HydraulicsError::IterationCap { .. }
        )
    }
}

pub type HydraulicsResult<T> = Result<T, HydraulicsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = HydraulicsError::OutOfCatalogRange {
            required_mm: 700.0,
            largest_mm: 605.4,
        };
        assert!(err.to_string().contains("605.4"));
    }

    #[test]
    fn nonconvergence_grouping() {
        assert!(HydraulicsError::IterationCap {
            iterations: 40,
            angle: 1.0
        }
        .is_nonconvergence());
        assert!(!HydraulicsError::AlreadySized.is_nonconvergence());
    }
}

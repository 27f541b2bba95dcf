use crate::SfError;

/// Floating point type used throughout system
pub type Real = f64;

/// Magnitude below which a negative depth is treated as round-off (m).
pub const DEPTH_EPSILON: Real = 1e-9;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, SfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SfError::NonFinite { what, value: v })
    }
}

/// Clamp a tiny negative residue to zero.
///
/// Returns `None` when the value is non-finite or more negative than `eps`;
/// callers turn that into their own physical-state error.
pub fn clamp_residue(v: Real, eps: Real) -> Option<Real> {
    if !v.is_finite() || v < -eps {
        None
    } else {
        Some(v.max(0.0))
    }
}

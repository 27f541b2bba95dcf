//! Partially-full circular cross-section geometry.
//!
//! `theta` is the central angle (rad) subtending the wetted perimeter and
//! `d` the inner diameter (m).

/// Fill angle for a depth ratio `y/D` in `[0, 1]`.
pub fn fill_angle(fill_ratio: f64) -> f64 {
    2.0 * (1.0 - 2.0 * fill_ratio).acos()
}

/// Flow area (m²).
pub fn wetted_area(d: f64, theta: f64) -> f64 {
    d * d / 8.0 * (theta - theta.sin())
}

/// Hydraulic radius (m).
pub fn hydraulic_radius(d: f64, theta: f64) -> f64 {
    d / 4.0 * (1.0 - theta.sin() / theta)
}

/// Free-surface width (m).
pub fn top_width(d: f64, theta: f64) -> f64 {
    d * (theta / 2.0).sin()
}

/// Flow depth (m).
pub fn flow_depth(d: f64, theta: f64) -> f64 {
    d / 2.0 * (1.0 - (theta / 2.0).cos())
}

/// Dimensionless conveyance `(θ − sinθ)·(1 − sinθ/θ)^(2/3)`.
pub fn shape_factor(theta: f64) -> f64 {
    (theta - theta.sin()) * (1.0 - theta.sin() / theta).powf(2.0 / 3.0)
}

/// `2^(13/3)`, the constant linking [`shape_factor`] to the Strickler discharge.
pub(crate) fn conveyance_constant() -> f64 {
    2.0_f64.powf(13.0 / 3.0)
}

/// Uniform-flow discharge (m³/s) for Strickler coefficient `k` and slope `s`.
pub fn strickler_discharge(d: f64, theta: f64, k: f64, s: f64) -> f64 {
    k * s.sqrt() * wetted_area(d, theta) * hydraulic_radius(d, theta).powf(2.0 / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn half_full_pipe() {
        let theta = fill_angle(0.5);
        assert!((theta - PI).abs() < 1e-12);
        assert!((wetted_area(1.0, theta) - PI / 8.0).abs() < 1e-12);
        assert!((hydraulic_radius(1.0, theta) - 0.25).abs() < 1e-12);
        assert!((top_width(1.0, theta) - 1.0).abs() < 1e-12);
        assert!((flow_depth(1.0, theta) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn depth_matches_fill_ratio() {
        for ratio in [0.1, 0.3, 0.7, 0.8, 0.95] {
            let d = 0.6;
            assert!((flow_depth(d, fill_angle(ratio)) - ratio * d).abs() < 1e-12);
        }
    }

    #[test]
    fn shape_factor_reproduces_strickler() {
        let (d, theta, k, s) = (0.4, 3.5, 80.0, 0.01);
        let q = strickler_discharge(d, theta, k, s);
        let from_shape = k * s.sqrt() * d.powf(8.0 / 3.0) * shape_factor(theta) / conveyance_constant();
        assert!((q - from_shape).abs() < 1e-12);
    }
}

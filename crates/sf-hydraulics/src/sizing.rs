//! Automatic pipe sizing from a design discharge.
//!
//! The required diameter follows from the Gauckler-Strickler uniform-flow law
//! at the design fill angle. The next commercial size up is then taken and the
//! actual fill angle at that size is recovered by bisection.

use sf_core::units::{Length, Pressure, constants, m};
use tracing::{debug, warn};

use crate::catalog::{CommercialPipeCatalog, PipeSize};
use crate::cross_section::{self, conveyance_constant, shape_factor};
use crate::error::{HydraulicsError, HydraulicsResult};

/// Options for pipe sizing.
#[derive(Clone, Debug)]
pub struct SizingConfig {
    /// Design depth ratio `y/D`
    pub fill_coefficient: f64,
    /// Wall shear stress required for self-cleansing
    pub max_shear_stress: Pressure,
    /// Specific weight of water (N/m³)
    pub specific_weight: f64,
    /// Cover above the pipe crown
    pub minimum_excavation: Length,
    /// Slope used when the terrain is flat or rises downstream
    pub nominal_min_slope: f64,
    /// Downward steps searched for a sign change
    pub bracket_steps: usize,
    /// Bisection stops once the bracket is narrower than this (rad)
    pub angle_tolerance: f64,
    pub max_bisections: usize,
    /// Angles at or below zero are replaced by this floor (rad)
    pub min_angle: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            fill_coefficient: 0.8,
            max_shear_stress: constants::self_cleansing_shear(),
            specific_weight: constants::WATER_SPECIFIC_WEIGHT,
            minimum_excavation: m(1.0),
            nominal_min_slope: 0.001,
            bracket_steps: 10,
            angle_tolerance: 0.005,
            max_bisections: 40,
            min_angle: 0.01,
        }
    }
}

/// Result of sizing one link.
#[derive(Clone, Debug, PartialEq)]
pub struct PipeDesign {
    pub size: PipeSize,
    /// Adopted slope (m/m)
    pub slope: f64,
    /// Fill angle at the design discharge (rad)
    pub fill_angle: f64,
    /// Flow depth at the design discharge
    pub max_flow_depth: Length,
    /// Depth of the pipe invert below the terrain
    pub excavation: Length,
    /// Depth of the design water surface below the terrain
    pub water_depth: Length,
    /// Design discharge (m³/s)
    pub design_discharge: f64,
    /// True when the self-cleansing slope replaced the natural one
    pub min_slope_enforced: bool,
}

/// Sizes circular pipes against a commercial catalog.
#[derive(Clone, Debug)]
pub struct PipeSizingSolver {
    pub config: SizingConfig,
    pub catalog: CommercialPipeCatalog,
}

impl PipeSizingSolver {
    pub fn new(config: SizingConfig, catalog: CommercialPipeCatalog) -> HydraulicsResult<Self> {
        if !(config.fill_coefficient > 0.0 && config.fill_coefficient < 1.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "fill coefficient must be within (0, 1)",
            });
        }
        if config.bracket_steps == 0 || config.max_bisections == 0 {
            return Err(HydraulicsError::InvalidArg {
                what: "bracket steps and bisection cap must be positive",
            });
        }
        if !(config.nominal_min_slope > 0.0) {
            return Err(HydraulicsError::InvalidArg {
                what: "nominal minimum slope must be positive",
            });
        }
        Ok(Self { config, catalog })
    }

    /// Fill angle at the design fill coefficient.
    pub fn design_angle(&self) -> f64 {
        cross_section::fill_angle(self.config.fill_coefficient)
    }

    /// Diameter carrying `discharge` at the design fill angle.
    pub fn trial_diameter(&self, discharge: f64, slope: f64, roughness: f64) -> Length {
        let theta = self.design_angle();
        let numerator = (conveyance_constant() * discharge / (roughness * slope.sqrt() * theta))
            .powf(3.0 / 8.0);
        let denominator = (1.0 - theta.sin() / theta).powf(5.0 / 8.0);
        m(numerator / denominator)
    }

    /// Self-cleansing slope for inner diameter `inner` at the design fill.
    pub fn min_slope(&self, inner: Length) -> f64 {
        let radius = cross_section::hydraulic_radius(inner.value, self.design_angle());
        self.config.max_shear_stress.value / (self.config.specific_weight * radius)
    }

    /// Size a link for `discharge` (m³/s) given its terrain slope and Strickler roughness.
    ///
    /// A link that never carries flow gets the smallest catalog size, empty.
    pub fn size(
        &self,
        discharge: f64,
        natural_slope: f64,
        roughness: f64,
    ) -> HydraulicsResult<PipeDesign> {
        if !(discharge >= 0.0 && discharge.is_finite()) {
            return Err(HydraulicsError::InvalidArg {
                what: "design discharge must be finite and non-negative",
            });
        }
        if !(roughness > 0.0 && roughness.is_finite()) {
            return Err(HydraulicsError::InvalidArg {
                what: "Strickler roughness must be positive",
            });
        }

        let slope = if natural_slope > 0.0 && natural_slope.is_finite() {
            natural_slope
        } else {
            warn!(
                natural_slope,
                nominal = self.config.nominal_min_slope,
                "non-positive terrain slope, using nominal minimum"
            );
            self.config.nominal_min_slope
        };

        if discharge == 0.0 {
            return Ok(self.dry_design(slope));
        }

        let (mut size, mut theta) = self.solve_at(discharge, slope, roughness)?;
        let min_slope = self.min_slope(size.inner);
        let adopted = if slope < min_slope {
            warn!(slope, min_slope, "slope below self-cleansing minimum, re-sizing");
            (size, theta) = self.solve_at(discharge, min_slope, roughness)?;
            min_slope
        } else {
            slope
        };

        let inner = size.inner.value;
        let max_flow_depth = cross_section::flow_depth(inner, theta);
        let excavation = self.config.minimum_excavation + size.outer;
        let water_depth = self.config.minimum_excavation + size.wall() + m(inner - max_flow_depth);

        Ok(PipeDesign {
            size,
            slope: adopted,
            fill_angle: theta,
            max_flow_depth: m(max_flow_depth),
            excavation,
            water_depth,
            design_discharge: discharge,
            min_slope_enforced: adopted != slope,
        })
    }

    fn dry_design(&self, slope: f64) -> PipeDesign {
        let size = self.catalog.smallest();
        let min_slope = self.min_slope(size.inner);
        let adopted = slope.max(min_slope);
        debug!(inner_mm = size.inner.value * 1_000.0, slope = adopted, "dry link");
        PipeDesign {
            size,
            slope: adopted,
            fill_angle: 0.0,
            max_flow_depth: m(0.0),
            excavation: self.config.minimum_excavation + size.outer,
            water_depth: self.config.minimum_excavation + size.outer,
            design_discharge: 0.0,
            min_slope_enforced: adopted != slope,
        }
    }

    /// Trial diameter, catalog lookup and actual fill angle at one slope.
    fn solve_at(
        &self,
        discharge: f64,
        slope: f64,
        roughness: f64,
    ) -> HydraulicsResult<(PipeSize, f64)> {
        let trial = self.trial_diameter(discharge, slope, roughness);
        let size = self.catalog.select(trial)?;
        let known = conveyance_constant() * discharge
            / (roughness * slope.sqrt() * size.inner.value.powf(8.0 / 3.0));
        let theta = solve_fill_angle(known, self.design_angle(), &self.config)?;
        debug!(
            trial_mm = trial.value * 1_000.0,
            inner_mm = size.inner.value * 1_000.0,
            theta,
            "sized section"
        );
        Ok((size, theta))
    }
}

/// `known − (θ − sinθ)(1 − sinθ/θ)^(2/3)` with the angle floored at `min_angle`.
fn residual(known: f64, theta: f64, min_angle: f64) -> f64 {
    let theta = if theta <= 0.0 { min_angle } else { theta };
    known - shape_factor(theta)
}

/// Solve `(θ − sinθ)(1 − sinθ/θ)^(2/3) = known` for θ below `initial_angle`.
///
/// The angle is stepped down in `bracket_steps` equal steps until the residual
/// changes sign, then the bracket is bisected down to `angle_tolerance`.
pub fn solve_fill_angle(
    known: f64,
    initial_angle: f64,
    cfg: &SizingConfig,
) -> HydraulicsResult<f64> {
    if !known.is_finite() || !(initial_angle > 0.0) {
        return Err(HydraulicsError::InvalidArg {
            what: "fill-angle equation needs finite input and a positive start angle",
        });
    }

    let f0 = residual(known, initial_angle, cfg.min_angle);
    if f0 == 0.0 {
        return Ok(initial_angle);
    }

    let delta = initial_angle / cfg.bracket_steps as f64;
    let lower = (1..=cfg.bracket_steps)
        .map(|i| initial_angle - i as f64 * delta)
        .find(|&theta| f0 * residual(known, theta, cfg.min_angle) < 0.0)
        .ok_or(HydraulicsError::BracketNotFound {
            initial_angle,
            known,
        })?;
    debug!(lower, upper = lower + delta, "bracketed fill angle");

    bisect(known, lower, lower + delta, cfg)
}

fn bisect(known: f64, a: f64, b: f64, cfg: &SizingConfig) -> HydraulicsResult<f64> {
    let fa = residual(known, a, cfg.min_angle);
    let fb = residual(known, b, cfg.min_angle);
    if fa * fb >= 0.0 {
        return Err(HydraulicsError::BracketNotFound {
            initial_angle: b,
            known,
        });
    }

    // Orient so that the residual at `rtb` is negative
    let (mut dx, mut rtb) = if fa < 0.0 { (b - a, a) } else { (a - b, b) };

    for _ in 0..cfg.max_bisections {
        dx *= 0.5;
        let mid = rtb + dx;
        let fmid = residual(known, mid, cfg.min_angle);
        if fmid <= 0.0 {
            rtb = mid;
        }
        if dx.abs() < cfg.angle_tolerance || fmid == 0.0 {
            return Ok(rtb);
        }
    }

    Err(HydraulicsError::IterationCap {
        iterations: cfg.max_bisections,
        angle: rtb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::units::mm;

    fn solver() -> PipeSizingSolver {
        PipeSizingSolver::new(SizingConfig::default(), CommercialPipeCatalog::pvc()).unwrap()
    }

    #[test]
    fn trial_diameter_carries_design_discharge() {
        let s = solver();
        let d = s.trial_diameter(0.1, 0.01, 80.0).value;
        let q = cross_section::strickler_discharge(d, s.design_angle(), 80.0, 0.01);
        assert!((q - 0.1).abs() < 1e-10);
    }

    #[test]
    fn solved_angle_stays_below_design_angle() {
        let s = solver();
        let design = s.size(0.05, 0.02, 80.0).unwrap();
        assert!(design.fill_angle <= s.design_angle());
        assert!(design.max_flow_depth <= design.size.inner * s.config.fill_coefficient + mm(1e-6));
    }

    #[test]
    fn excavation_and_water_depth() {
        let s = solver();
        let design = s.size(0.05, 0.02, 80.0).unwrap();
        let exc = s.config.minimum_excavation + design.size.outer;
        assert!((design.excavation.value - exc.value).abs() < 1e-12);
        let wd = s.config.minimum_excavation.value + design.size.outer.value
            - design.max_flow_depth.value;
        assert!((design.water_depth.value - wd).abs() < 1e-12);
    }

    #[test]
    fn flat_terrain_uses_nominal_slope() {
        let s = solver();
        // The nominal slope is below the self-cleansing slope of any PVC size
        let design = s.size(0.02, 0.0, 80.0).unwrap();
        assert!(design.min_slope_enforced);
        assert!(design.slope > s.config.nominal_min_slope);
    }

    #[test]
    fn zero_discharge_gets_smallest_empty_pipe() {
        let s = solver();
        let design = s.size(0.0, 0.01, 80.0).unwrap();
        assert_eq!(design.size, s.catalog.smallest());
        assert_eq!(design.fill_angle, 0.0);
        assert_eq!(design.max_flow_depth, m(0.0));
        assert_eq!(design.slope, 0.01_f64.max(s.min_slope(design.size.inner)));
        assert!((design.water_depth - design.excavation).value.abs() < 1e-12);
    }

    #[test]
    fn negative_discharge_rejected() {
        assert!(matches!(
            solver().size(-0.1, 0.01, 80.0).unwrap_err(),
            HydraulicsError::InvalidArg { .. }
        ));
    }

    #[test]
    fn bracket_not_found_when_known_exceeds_capacity() {
        // Above the design conveyance every residual is positive.
        let cfg = SizingConfig::default();
        let theta0 = cross_section::fill_angle(cfg.fill_coefficient);
        let known = shape_factor(theta0) * 2.0;
        assert!(matches!(
            solve_fill_angle(known, theta0, &cfg).unwrap_err(),
            HydraulicsError::BracketNotFound { .. }
        ));
    }

    #[test]
    fn exact_start_angle_is_returned() {
        let cfg = SizingConfig::default();
        let theta0 = 2.0;
        assert_eq!(solve_fill_angle(shape_factor(theta0), theta0, &cfg).unwrap(), theta0);
    }

    #[test]
    fn iteration_cap_reported() {
        let cfg = SizingConfig {
            max_bisections: 2,
            angle_tolerance: 1e-9,
            ..SizingConfig::default()
        };
        let theta0 = cross_section::fill_angle(cfg.fill_coefficient);
        let known = shape_factor(1.3);
        assert!(matches!(
            solve_fill_angle(known, theta0, &cfg).unwrap_err(),
            HydraulicsError::IterationCap { iterations: 2, .. }
        ));
    }
}

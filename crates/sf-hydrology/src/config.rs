//! Runoff solver options.

use crate::ode::{DormandPrince, IntegratorType, RK4};

/// Options for the nonlinear-reservoir runoff model.
#[derive(Clone, Debug)]
pub struct RunoffConfig {
    /// Integrator type (default: Dormand-Prince)
    pub integrator: IntegratorType,
    /// Absolute ODE tolerance (m)
    pub abs_tol: f64,
    /// Relative ODE tolerance
    pub rel_tol: f64,
    /// Smallest adaptive step (s)
    pub min_step: f64,
    /// Largest adaptive step, also the RK4 sub-step (s)
    pub max_step: f64,
    /// Multiplier from outflow·area (m³/s) to the reported discharge unit
    pub flow_conversion: f64,
}

impl Default for RunoffConfig {
    fn default() -> Self {
        Self {
            integrator: IntegratorType::default(),
            abs_tol: 1e-5,
            rel_tol: 1e-5,
            min_step: 1e-8,
            max_step: 1e3,
            flow_conversion: 1.0,
        }
    }
}

impl RunoffConfig {
    pub(crate) fn dormand_prince(&self) -> DormandPrince {
        DormandPrince {
            abs_tol: self.abs_tol,
            rel_tol: self.rel_tol,
            min_step: self.min_step,
            max_step: self.max_step,
        }
    }

    pub(crate) fn rk4(&self) -> RK4 {
        RK4 {
            max_step: self.max_step,
        }
    }
}

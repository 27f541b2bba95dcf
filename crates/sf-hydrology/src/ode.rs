//! Scalar ODE integrators for the nonlinear reservoir.

use crate::error::{RunoffError, RunoffResult};

/// Right-hand side of a scalar ODE `dy/dt = f(t, y)`.
pub trait ScalarOde {
    fn rhs(&self, t: f64, y: f64) -> f64;
}

impl<F: Fn(f64, f64) -> f64> ScalarOde for F {
    fn rhs(&self, t: f64, y: f64) -> f64 {
        self(t, y)
    }
}

/// Trait for integrators advancing a scalar state over `[t0, t1]`.
pub trait Integrator {
    fn integrate<O: ScalarOde>(&self, ode: &O, t0: f64, y0: f64, t1: f64) -> RunoffResult<f64>;
}

/// Integrator selection for runoff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// Adaptive Dormand-Prince 5(4) (default).
    #[default]
    DormandPrince,
    /// Classical RK4 with fixed sub-steps no longer than `max_step`.
    RK4,
}

/// Classical RK4 (Runge-Kutta 4th order) with uniform sub-steps.
#[derive(Clone, Debug)]
pub struct RK4 {
    pub max_step: f64,
}

impl Integrator for RK4 {
    fn integrate<O: ScalarOde>(&self, ode: &O, t0: f64, y0: f64, t1: f64) -> RunoffResult<f64> {
        if self.max_step <= 0.0 {
            return Err(RunoffError::InvalidArg {
                what: "max_step must be positive",
            });
        }
        let span = t1 - t0;
        let n = (span / self.max_step).ceil().max(1.0) as usize;
        let dt = span / n as f64;

        let mut t = t0;
        let mut y = y0;
        for _ in 0..n {
            let k1 = ode.rhs(t, y);
            let k2 = ode.rhs(t + 0.5 * dt, y + 0.5 * dt * k1);
            let k3 = ode.rhs(t + 0.5 * dt, y + 0.5 * dt * k2);
            let k4 = ode.rhs(t + dt, y + dt * k3);
            y += dt / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
            t += dt;
        }
        Ok(y)
    }
}

/// Adaptive Dormand-Prince 5(4) with local error control.
#[derive(Clone, Debug)]
pub struct DormandPrince {
    pub abs_tol: f64,
    pub rel_tol: f64,
    pub min_step: f64,
    pub max_step: f64,
}

impl Default for DormandPrince {
    fn default() -> Self {
        Self {
            abs_tol: 1e-5,
            rel_tol: 1e-5,
            min_step: 1e-8,
            max_step: 1e3,
        }
    }
}

// Butcher tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th order weights (also row 7 of the tableau)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between 5th and 4th order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

impl Integrator for DormandPrince {
    fn integrate<O: ScalarOde>(&self, ode: &O, t0: f64, y0: f64, t1: f64) -> RunoffResult<f64> {
        if self.min_step <= 0.0 || self.max_step < self.min_step {
            return Err(RunoffError::InvalidArg {
                what: "step bounds must satisfy 0 < min_step <= max_step",
            });
        }

        let mut t = t0;
        let mut y = y0;
        let mut h = self.max_step.min(t1 - t0);
        let mut k1 = ode.rhs(t, y);

        while t1 - t > 0.0 {
            h = h.min(t1 - t);

            let k2 = ode.rhs(t + C2 * h, y + h * A21 * k1);
            let k3 = ode.rhs(t + C3 * h, y + h * (A31 * k1 + A32 * k2));
            let k4 = ode.rhs(t + C4 * h, y + h * (A41 * k1 + A42 * k2 + A43 * k3));
            let k5 = ode.rhs(
                t + C5 * h,
                y + h * (A51 * k1 + A52 * k2 + A53 * k3 + A54 * k4),
            );
            let k6 = ode.rhs(
                t + h,
                y + h * (A61 * k1 + A62 * k2 + A63 * k3 + A64 * k4 + A65 * k5),
            );
            let y_new = y + h * (B1 * k1 + B3 * k3 + B4 * k4 + B5 * k5 + B6 * k6);
            let k7 = ode.rhs(t + h, y_new);

            let err = (h * (E1 * k1 + E3 * k3 + E4 * k4 + E5 * k5 + E6 * k6 + E7 * k7)).abs();
            let scale = self.abs_tol + self.rel_tol * y.abs().max(y_new.abs());
            let ratio = err / scale;

            if !y_new.is_finite() {
                return Err(RunoffError::InvalidPhysicalState {
                    what: "integrated depth",
                    value: y_new,
                });
            }

            // A step clipped below min_step by the interval end is always taken.
            let tail = h < self.min_step;
            if ratio <= 1.0 || tail {
                t += h;
                y = y_new;
                // First-same-as-last
                k1 = k7;
            } else if h <= self.min_step {
                return Err(RunoffError::StepSizeUnderflow { t, step: h });
            }

            let factor = if ratio == 0.0 {
                5.0
            } else {
                (0.9 * ratio.powf(-0.2)).clamp(0.2, 5.0)
            };
            h = (h * factor).clamp(self.min_step, self.max_step);
        }

        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rk4_exponential_decay() {
        let ode = |_t: f64, y: f64| -y;
        let y = RK4 { max_step: 0.01 }.integrate(&ode, 0.0, 1.0, 1.0).unwrap();
        assert!((y - (-1.0_f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn dormand_prince_exponential_decay() {
        let ode = |_t: f64, y: f64| -y;
        let dp = DormandPrince {
            abs_tol: 1e-10,
            rel_tol: 1e-10,
            ..DormandPrince::default()
        };
        let y = dp.integrate(&ode, 0.0, 1.0, 1.0).unwrap();
        assert!((y - (-1.0_f64).exp()).abs() < 1e-8);
    }

    #[test]
    fn dormand_prince_hits_end_exactly_for_linear_growth() {
        let ode = |_t: f64, _y: f64| 2.0;
        let y = DormandPrince::default()
            .integrate(&ode, 0.0, 0.5, 60.0)
            .unwrap();
        assert!((y - 120.5).abs() < 1e-9);
    }

    #[test]
    fn zero_span_is_identity() {
        let ode = |_t: f64, y: f64| y;
        assert_eq!(
            DormandPrince::default().integrate(&ode, 3.0, 7.0, 3.0).unwrap(),
            7.0
        );
        assert_eq!(
            RK4 { max_step: 1.0 }.integrate(&ode, 3.0, 7.0, 3.0).unwrap(),
            7.0
        );
    }

    #[test]
    fn invalid_step_bounds_rejected() {
        let ode = |_t: f64, y: f64| y;
        let dp = DormandPrince {
            min_step: 0.0,
            ..DormandPrince::default()
        };
        assert!(dp.integrate(&ode, 0.0, 1.0, 1.0).is_err());
    }
}

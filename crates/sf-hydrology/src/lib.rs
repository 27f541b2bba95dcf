//! Rainfall-runoff generation for stormflow.
//!
//! Provides:
//! - Nonlinear-reservoir sub-areas (pervious, impervious with/without storage)
//! - Subcatchments with cascading sub-area routing and outlet aggregation
//! - Scalar ODE integrators (adaptive Dormand-Prince, fixed-step RK4)
//! - Rainfall adaptation and synthetic design storms

pub mod config;
pub mod error;
pub mod ode;
pub mod rainfall;
pub mod subarea;
pub mod subcatchment;

// Re-exports for public API
pub use config::RunoffConfig;
pub use error::{RunoffError, RunoffResult};
pub use ode::{DormandPrince, Integrator, IntegratorType, RK4, ScalarOde};
pub use rainfall::{DesignStorms, adapt_rainfall};
pub use subarea::{Subarea, SubareaHistory, SubareaKind, SubareaRouting, SubareaState};
pub use subcatchment::{InternalRouting, SplitParams, Subcatchment, SurfaceParams};

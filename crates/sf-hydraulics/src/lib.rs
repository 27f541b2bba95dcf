//! Link hydraulics for stormflow.
//!
//! Provides:
//! - Partially-full circular cross-section geometry
//! - Commercial pipe catalogs
//! - Pipe sizing (closed-form trial diameter, catalog lookup, fill-angle bisection,
//!   self-cleansing minimum slope, excavation depths)
//! - Muskingum-Cunge kinematic-wave routing
//! - Conduit state with one-shot sizing and end offsets

pub mod catalog;
pub mod conduit;
pub mod cross_section;
pub mod error;
pub mod routing;
pub mod sizing;

// Re-exports for public API
pub use catalog::{CommercialPipeCatalog, PipeSize};
pub use conduit::{Conduit, ConduitEnd};
pub use error::{HydraulicsError, HydraulicsResult};
pub use routing::MuskingumCunge;
pub use sizing::{PipeDesign, PipeSizingSolver, SizingConfig, solve_fill_angle};

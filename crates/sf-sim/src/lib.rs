//! Network simulation for stormflow.
//!
//! Provides:
//! - Node inflow accumulation (additive merge of runoff and routed flow)
//! - Per-link peak search, automatic sizing and kinematic-wave propagation
//! - Invert offset normalisation at confluences
//! - The run driver, with subcatchments evaluated in parallel

pub mod error;
pub mod link_routing;
pub mod network;
pub mod node;
pub mod offsets;
pub mod run;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use link_routing::{LinkRouter, RoutedLink};
pub use network::{CatchmentInlet, Network};
pub use node::NodeInflow;
pub use offsets::normalize_offsets;
pub use run::{CatchmentResult, LinkResult, SimOptions, SimReport, run_network};

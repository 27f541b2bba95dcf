//! sf-core: stable foundation for stormflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + float helpers)
//! - ids (stable compact IDs for network objects, scenario ids)
//! - time (timestamps and fixed-step time grids)
//! - series (time series keyed by timestamp, partitioned by scenario)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod series;
pub mod time;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{SfError, SfResult};
pub use ids::*;
pub use numeric::*;
pub use series::{ScenarioSeries, TimeSeries};
pub use time::{TimeGrid, Timestamp};

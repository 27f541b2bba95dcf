//! Error types for network simulation.

use sf_core::{ScenarioId, SfError};
use sf_graph::GraphError;
use sf_hydraulics::HydraulicsError;
use sf_hydrology::RunoffError;
use thiserror::Error;

/// Errors aborting a network run, tagged with the failing element.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Subcatchment {name}: {source}")]
    Subcatchment { name: String, source: RunoffError },

    #[error("Link {name}: {source}")]
    Link {
        name: String,
        source: HydraulicsError,
    },

    #[error("Missing data for {what} ({scenario} at {time})")]
    MissingData {
        what: String,
        scenario: ScenarioId,
        time: String,
    },

    #[error("Network topology: {0}")]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Core(#[from] SfError),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn link(name: &str, source: impl Into<HydraulicsError>) -> Self {
        SimError::Link {
            name: name.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn subcatchment(name: &str, source: impl Into<RunoffError>) -> Self {
        SimError::Subcatchment {
            name: name.to_string(),
            source: source.into(),
        }
    }
}

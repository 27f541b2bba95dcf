//! Node inflow accumulation.

use sf_core::{NodeId, ScenarioId, ScenarioSeries, TimeSeries};

/// Inflow of one node: additive merge of runoff and upstream link discharges.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeInflow {
    pub node: NodeId,
    runoff: ScenarioSeries,
    routed: ScenarioSeries,
    total: ScenarioSeries,
}

impl NodeInflow {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            runoff: ScenarioSeries::new(),
            routed: ScenarioSeries::new(),
            total: ScenarioSeries::new(),
        }
    }

    /// Add a subcatchment discharge; shared timestamps are summed.
    pub fn add_runoff_inflow(&mut self, scenario: ScenarioId, series: &TimeSeries) {
        self.runoff.merge_add_series(scenario, series);
        self.total.merge_add_series(scenario, series);
    }

    /// Add an upstream link discharge; shared timestamps are summed.
    pub fn add_routing_inflow(&mut self, scenario: ScenarioId, series: &TimeSeries) {
        self.routed.merge_add_series(scenario, series);
        self.total.merge_add_series(scenario, series);
    }

    /// Sum of everything added so far.
    pub fn total(&self) -> &ScenarioSeries {
        &self.total
    }

    pub fn runoff(&self) -> &ScenarioSeries {
        &self.runoff
    }

    pub fn routed(&self) -> &ScenarioSeries {
        &self.routed
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }
}

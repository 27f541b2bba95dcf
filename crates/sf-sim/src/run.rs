//! Network run driver.

use rayon::prelude::*;
use sf_core::{LinkId, NodeId, ScenarioId, ScenarioSeries, TimeGrid, TimeSeries};
use sf_hydraulics::{HydraulicsError, PipeDesign, PipeSizingSolver};
use sf_hydrology::RunoffConfig;
use tracing::info;

use crate::error::{SimError, SimResult};
use crate::link_routing::LinkRouter;
use crate::network::{CatchmentInlet, Network};
use crate::node::NodeInflow;
use crate::offsets::normalize_offsets;

/// Options for network runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Time axis of the runoff model
    pub runoff_grid: TimeGrid,
    /// Time axis of link routing (may differ from the runoff axis)
    pub routing_grid: TimeGrid,
    /// Potential evaporation rate (m/s)
    pub evaporation: f64,
    pub runoff: RunoffConfig,
    pub sizing: PipeSizingSolver,
    /// Evaluate subcatchments on the rayon pool
    pub parallel: bool,
}

impl SimOptions {
    pub fn new(runoff_grid: TimeGrid, routing_grid: TimeGrid, sizing: PipeSizingSolver) -> Self {
        Self {
            runoff_grid,
            routing_grid,
            evaporation: 0.0,
            runoff: RunoffConfig::default(),
            sizing,
            parallel: true,
        }
    }
}

/// Discharge of one subcatchment on the routing grid.
#[derive(Clone, Debug, PartialEq)]
pub struct CatchmentResult {
    pub name: String,
    pub node: NodeId,
    pub discharge: ScenarioSeries,
}

/// Final state of one link.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkResult {
    pub link: LinkId,
    pub name: String,
    pub peak_discharge: f64,
    pub design: PipeDesign,
    pub upstream_offset: f64,
    pub downstream_offset: f64,
    pub upstream_invert_elevation: f64,
    pub downstream_invert_elevation: f64,
    pub downstream_water_depth: f64,
    pub upstream_flow: ScenarioSeries,
    pub downstream_flow: ScenarioSeries,
}

/// Everything produced by [`run_network`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimReport {
    pub scenarios: Vec<ScenarioId>,
    pub catchments: Vec<CatchmentResult>,
    pub node_inflows: Vec<NodeInflow>,
    pub links: Vec<LinkResult>,
}

/// Runoff, then sizing and routing of every link from the headwaters down.
///
/// `rainfall` holds one series per scenario on the runoff grid (m/s).
pub fn run_network(
    network: &mut Network,
    rainfall: &ScenarioSeries,
    options: &SimOptions,
) -> SimResult<SimReport> {
    let scenarios: Vec<ScenarioId> = rainfall.scenarios().collect();
    if scenarios.is_empty() {
        return Err(SimError::InvalidArg {
            what: "at least one rainfall scenario is required",
        });
    }

    if options.routing_grid.last() > options.runoff_grid.last() {
        return Err(SimError::InvalidArg {
            what: "routing grid ends after the last runoff instant",
        });
    }

    let (graph, conduits, catchments) = network.parts_mut();

    info!(
        catchments = catchments.len(),
        scenarios = scenarios.len(),
        "runoff phase"
    );
    let runoff = |inlet: &mut CatchmentInlet| run_catchment(inlet, rainfall, &scenarios, options);
    let catchment_results: Vec<CatchmentResult> = if options.parallel {
        catchments
            .par_iter_mut()
            .map(runoff)
            .collect::<SimResult<_>>()?
    } else {
        catchments.iter_mut().map(runoff).collect::<SimResult<_>>()?
    };

    let mut inflows: Vec<NodeInflow> = graph.nodes().iter().map(|n| NodeInflow::new(n.id)).collect();
    for result in &catchment_results {
        for (scenario, series) in result.discharge.iter() {
            inflows[result.node.slot()].add_runoff_inflow(scenario, series);
        }
    }

    info!(links = conduits.len(), "routing phase");
    let router = LinkRouter::new(&options.sizing);
    let mut routed = Vec::with_capacity(conduits.len());
    for &link_id in graph.upstream_first_links() {
        let Some(link) = graph.link(link_id) else {
            continue;
        };
        let upstream = inflows[link.upstream.slot()].total().clone();
        let outcome = router.route(
            &mut conduits[link_id.slot()],
            &upstream,
            &scenarios,
            &options.routing_grid,
        )?;

        let branches = graph.converging_branches(link_id);
        if !branches.is_empty() {
            normalize_offsets(conduits, link_id, &branches)?;
        }

        for (scenario, series) in outcome.downstream.iter() {
            inflows[link.downstream.slot()].add_routing_inflow(scenario, series);
        }
        routed.push((link_id, outcome.peak_discharge, upstream, outcome.downstream));
    }

    // Offsets are final only once every confluence has been normalised
    let mut links = Vec::with_capacity(routed.len());
    for (link_id, peak, upstream_flow, downstream_flow) in routed {
        let conduit = &conduits[link_id.slot()];
        let to_link = |e: HydraulicsError| SimError::link(&conduit.name, e);
        let design = conduit
            .design()
            .cloned()
            .ok_or_else(|| to_link(HydraulicsError::NotSized))?;
        let (up_z, down_z) = conduit.invert_elevations().map_err(to_link)?;
        links.push(LinkResult {
            link: link_id,
            name: conduit.name.clone(),
            peak_discharge: peak,
            design,
            upstream_offset: conduit.upstream.offset.value,
            downstream_offset: conduit.downstream.offset.value,
            upstream_invert_elevation: up_z.value,
            downstream_invert_elevation: down_z.value,
            downstream_water_depth: conduit.downstream_water_depth().map_err(to_link)?.value,
            upstream_flow,
            downstream_flow,
        });
    }

    Ok(SimReport {
        scenarios,
        catchments: catchment_results,
        node_inflows: inflows,
        links,
    })
}

fn run_catchment(
    inlet: &mut CatchmentInlet,
    rainfall: &ScenarioSeries,
    scenarios: &[ScenarioId],
    options: &SimOptions,
) -> SimResult<CatchmentResult> {
    let sub = &mut inlet.subcatchment;
    let name = sub.name.clone();
    let mut discharge = ScenarioSeries::new();
    for &scenario in scenarios {
        let rain = rainfall.series(scenario)?;
        sub.run(
            scenario,
            rain,
            options.evaporation,
            &options.runoff_grid,
            &options.runoff,
        )
        .map_err(|e| SimError::subcatchment(&name, e))?;
        let flow: TimeSeries = sub
            .evaluate_total_flow(scenario, &options.runoff)
            .map_err(|e| SimError::subcatchment(&name, e))?;
        let on_routing_grid = flow
            .resample(&options.routing_grid)
            .map_err(|e| SimError::subcatchment(&name, e))?;
        discharge.insert(scenario, on_routing_grid);
    }
    Ok(CatchmentResult {
        name,
        node: inlet.node,
        discharge,
    })
}

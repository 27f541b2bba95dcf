//! Project execution and run reports.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sf_core::ScenarioSeries;
use sf_project::schema::Project;
use sf_sim::{SimReport, run_network};
use tracing::info;

use crate::compile::compile_project;
use crate::error::{AppError, AppResult};

/// Sizing and placement of one link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkReport {
    pub id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    pub peak_discharge_m3_per_s: f64,
    pub inner_diameter_mm: f64,
    pub outer_diameter_mm: f64,
    pub slope: f64,
    pub min_slope_enforced: bool,
    pub fill_angle_rad: f64,
    pub max_flow_depth_m: f64,
    pub excavation_m: f64,
    pub water_depth_m: f64,
    pub upstream_offset_m: f64,
    pub downstream_offset_m: f64,
    pub upstream_invert_elevation_m: f64,
    pub downstream_invert_elevation_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeReport {
    pub id: String,
    pub peak_inflow_m3_per_s: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SeriesKind {
    /// Total inflow of a node
    NodeInflow,
    /// Discharge leaving the downstream end of a link
    LinkOutflow,
    /// Discharge of a subcatchment outlet
    SubcatchmentRunoff,
}

/// One discharge series (m³/s) of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesRecord {
    pub kind: SeriesKind,
    pub id: String,
    pub scenario: u32,
    /// RFC 3339 timestamps
    pub times: Vec<String>,
    pub values: Vec<f64>,
}

/// Serialisable outcome of a project run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub project: String,
    pub scenarios: Vec<u32>,
    pub links: Vec<LinkReport>,
    pub nodes: Vec<NodeReport>,
    pub series: Vec<SeriesRecord>,
}

/// Compile and run `project`, returning its report.
pub fn run_project(project: &Project) -> AppResult<RunReport> {
    let mut compiled = compile_project(project)?;
    let report = run_network(&mut compiled.network, &compiled.rainfall, &compiled.options)?;
    info!(
        project = %project.name,
        links = report.links.len(),
        "run complete"
    );
    build_report(project, &compiled.network, &report)
}

fn push_series(out: &mut Vec<SeriesRecord>, kind: SeriesKind, id: &str, series: &ScenarioSeries) {
    for (scenario, ts) in series.iter() {
        out.push(SeriesRecord {
            kind,
            id: id.to_string(),
            scenario: scenario.0,
            times: ts.times().map(|t| t.to_rfc3339()).collect(),
            values: ts.values().collect(),
        });
    }
}

fn build_report(
    project: &Project,
    network: &sf_sim::Network,
    sim: &SimReport,
) -> AppResult<RunReport> {
    let graph = network.graph();
    let node_name = |id| {
        graph
            .node(id)
            .map(|n| n.name.clone())
            .ok_or_else(|| AppError::NotFound(format!("node {id}")))
    };

    let mut links = Vec::with_capacity(sim.links.len());
    for result in &sim.links {
        let link = graph
            .link(result.link)
            .ok_or_else(|| AppError::NotFound(format!("link {}", result.name)))?;
        let design = &result.design;
        links.push(LinkReport {
            id: result.name.clone(),
            from_node_id: node_name(link.upstream)?,
            to_node_id: node_name(link.downstream)?,
            peak_discharge_m3_per_s: result.peak_discharge,
            inner_diameter_mm: design.size.inner.value * 1_000.0,
            outer_diameter_mm: design.size.outer.value * 1_000.0,
            slope: design.slope,
            min_slope_enforced: design.min_slope_enforced,
            fill_angle_rad: design.fill_angle,
            max_flow_depth_m: design.max_flow_depth.value,
            excavation_m: design.excavation.value,
            water_depth_m: design.water_depth.value,
            upstream_offset_m: result.upstream_offset,
            downstream_offset_m: result.downstream_offset,
            upstream_invert_elevation_m: result.upstream_invert_elevation,
            downstream_invert_elevation_m: result.downstream_invert_elevation,
        });
    }

    let mut nodes = Vec::new();
    let mut series = Vec::new();
    for inflow in &sim.node_inflows {
        if inflow.is_empty() {
            continue;
        }
        let id = node_name(inflow.node)?;
        nodes.push(NodeReport {
            id: id.clone(),
            peak_inflow_m3_per_s: inflow.total().max_value().unwrap_or(0.0),
        });
        push_series(&mut series, SeriesKind::NodeInflow, &id, inflow.total());
    }
    for result in &sim.links {
        push_series(
            &mut series,
            SeriesKind::LinkOutflow,
            &result.name,
            &result.downstream_flow,
        );
    }
    for catchment in &sim.catchments {
        push_series(
            &mut series,
            SeriesKind::SubcatchmentRunoff,
            &catchment.name,
            &catchment.discharge,
        );
    }

    Ok(RunReport {
        project: project.name.clone(),
        scenarios: sim.scenarios.iter().map(|s| s.0).collect(),
        links,
        nodes,
        series,
    })
}

/// Write `report` as pretty-printed JSON.
pub fn save_report_json(path: &Path, report: &RunReport) -> AppResult<()> {
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

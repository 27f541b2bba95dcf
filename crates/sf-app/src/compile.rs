//! Compilation of a project into runtime network objects.

use std::collections::HashMap;

use sf_core::time::parse_timestamp;
use sf_core::units::{m, mm, mm_per_hour, pa};
use sf_core::{NodeId, ScenarioId, ScenarioSeries, TimeGrid, TimeSeries};
use sf_graph::GraphBuilder;
use sf_hydraulics::{
    CommercialPipeCatalog, Conduit, ConduitEnd, PipeSize, PipeSizingSolver, SizingConfig,
};
use sf_hydrology::{
    DesignStorms, InternalRouting, IntegratorType, RunoffConfig, SplitParams, Subcatchment,
    SurfaceParams, adapt_rainfall,
};
use sf_project::schema::{
    CatalogDef, IntegratorDef, InternalRoutingDef, Project, RainfallDef, RunoffDef, SizingDef,
    SubcatchmentDef, SurfaceDef, TimeDef,
};
use sf_sim::{CatchmentInlet, Network, SimOptions};
use tracing::info;

use crate::error::{AppError, AppResult};

/// Everything needed to run a project.
#[derive(Clone, Debug)]
pub struct CompiledProject {
    pub network: Network,
    /// Rainfall per scenario on the runoff grid (m/s)
    pub rainfall: ScenarioSeries,
    pub options: SimOptions,
}

fn compile_err(what: impl std::fmt::Display) -> AppError {
    AppError::Compile(what.to_string())
}

/// Build the network, rainfall scenarios and run options of `project`.
pub fn compile_project(project: &Project) -> AppResult<CompiledProject> {
    let (runoff_grid, routing_grid) = build_grids(&project.time)?;

    let mut builder = GraphBuilder::new();
    let mut node_map: HashMap<&str, (NodeId, f64)> = HashMap::new();
    for node in &project.nodes {
        let id = builder.add_node(&node.id);
        node_map.insert(node.id.as_str(), (id, node.terrain_elevation_m));
    }
    let lookup = |id: &str| {
        node_map
            .get(id)
            .copied()
            .ok_or_else(|| compile_err(format!("Node not found: {id}")))
    };

    let mut ends = Vec::with_capacity(project.links.len());
    for link in &project.links {
        let (from, z_from) = lookup(&link.from_node_id)?;
        let (to, z_to) = lookup(&link.to_node_id)?;
        let link_id = builder.add_link(&link.id, from, to);
        ends.push((
            link_id,
            ConduitEnd::new(from, m(z_from)),
            ConduitEnd::new(to, m(z_to)),
        ));
    }
    let graph = builder
        .build()
        .map_err(|e| compile_err(format!("Graph build error: {e}")))?;

    let conduits = project
        .links
        .iter()
        .zip(ends)
        .map(|(link, (id, up, down))| {
            Conduit::new(id, &link.id, m(link.length_m), link.roughness, up, down)
                .map_err(|e| compile_err(format!("Link {}: {e}", link.id)))
        })
        .collect::<AppResult<Vec<_>>>()?;

    let catchments = project
        .subcatchments
        .iter()
        .map(|def| {
            let (node, _) = lookup(&def.node_id)?;
            Ok(CatchmentInlet {
                subcatchment: build_subcatchment(def)?,
                node,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let network =
        Network::new(graph, conduits, catchments).map_err(|e| compile_err(e.to_string()))?;
    let rainfall = build_rainfall(&project.rainfall, &runoff_grid)?;

    let mut options = SimOptions::new(runoff_grid, routing_grid, build_solver(project)?);
    options.runoff = runoff_config(&project.runoff);
    options.evaporation = mm_per_hour(project.runoff.evaporation_mm_per_hour).value;

    info!(
        project = %project.name,
        nodes = project.nodes.len(),
        links = project.links.len(),
        scenarios = rainfall.len(),
        "project compiled"
    );
    Ok(CompiledProject {
        network,
        rainfall,
        options,
    })
}

/// Runoff and routing grids over the project window.
pub fn build_grids(time: &TimeDef) -> AppResult<(TimeGrid, TimeGrid)> {
    let start = parse_timestamp(&time.start).map_err(compile_err)?;
    let end = parse_timestamp(&time.end).map_err(compile_err)?;
    let runoff = TimeGrid::new(start, end, time.runoff_step_s).map_err(compile_err)?;
    let routing = TimeGrid::new(start, end, time.routing_step()).map_err(compile_err)?;
    Ok((runoff, routing))
}

/// Rainfall scenarios on `grid`, in m/s.
pub fn build_rainfall(def: &RainfallDef, grid: &TimeGrid) -> AppResult<ScenarioSeries> {
    match def {
        RainfallDef::Record { samples } => {
            let points = samples
                .iter()
                .map(|s| {
                    let t = parse_timestamp(&s.time).map_err(compile_err)?;
                    Ok((t, mm_per_hour(s.intensity_mm_per_hour).value))
                })
                .collect::<AppResult<Vec<_>>>()?;
            let raw = TimeSeries::from_points(points).map_err(compile_err)?;
            let mut out = ScenarioSeries::new();
            out.insert(ScenarioId(1), adapt_rainfall(&raw, grid));
            Ok(out)
        }
        RainfallDef::DesignStorms { a, n, count } => DesignStorms {
            a: *a,
            n: *n,
            count: *count,
        }
        .scenarios(grid)
        .map_err(compile_err),
    }
}

fn surface(def: &SurfaceDef) -> SurfaceParams {
    SurfaceParams {
        depression_storage: mm(def.depression_storage_mm).value,
        roughness: def.roughness,
    }
}

fn build_subcatchment(def: &SubcatchmentDef) -> AppResult<Subcatchment> {
    let routing = match def.routing {
        InternalRoutingDef::Outlet => InternalRouting::Outlet,
        InternalRoutingDef::PerviousToImpervious { routed_pct } => {
            InternalRouting::PerviousToImpervious {
                fraction: routed_pct / 100.0,
            }
        }
        InternalRoutingDef::ImperviousToPervious { routed_pct } => {
            InternalRouting::ImperviousToPervious {
                fraction: routed_pct / 100.0,
            }
        }
    };
    let params = SplitParams {
        impervious_fraction: def.impervious_pct / 100.0,
        impervious_without_storage_fraction: def.impervious_without_storage_pct / 100.0,
        pervious: surface(&def.pervious),
        impervious: surface(&def.impervious),
        routing,
    };
    Subcatchment::split(&def.id, def.area_m2, def.slope, def.width_m, &params)
        .map_err(|e| compile_err(format!("Subcatchment {}: {e}", def.id)))
}

fn runoff_config(def: &RunoffDef) -> RunoffConfig {
    RunoffConfig {
        integrator: match def.integrator {
            IntegratorDef::DormandPrince => IntegratorType::DormandPrince,
            IntegratorDef::RK4 => IntegratorType::RK4,
        },
        abs_tol: def.abs_tol,
        rel_tol: def.rel_tol,
        min_step: def.min_step_s,
        max_step: def.max_step_s,
        flow_conversion: def.flow_conversion,
    }
}

fn sizing_config(def: &SizingDef) -> SizingConfig {
    SizingConfig {
        fill_coefficient: def.fill_coefficient,
        max_shear_stress: pa(def.max_shear_stress_pa),
        minimum_excavation: m(def.minimum_excavation_m),
        nominal_min_slope: def.nominal_min_slope,
        ..SizingConfig::default()
    }
}

fn build_solver(project: &Project) -> AppResult<PipeSizingSolver> {
    let catalog = match &project.catalog {
        CatalogDef::Pvc => CommercialPipeCatalog::pvc(),
        CatalogDef::Custom { name, sizes } => CommercialPipeCatalog::new(
            name.as_str(),
            sizes
                .iter()
                .map(|s| PipeSize::from_mm(s.inner_mm, s.outer_mm))
                .collect(),
        )
        .map_err(|e| compile_err(format!("Catalog {name}: {e}")))?,
    };
    PipeSizingSolver::new(sizing_config(&project.sizing), catalog).map_err(compile_err)
}

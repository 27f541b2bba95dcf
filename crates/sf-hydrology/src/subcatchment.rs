//! Subcatchments: cascaded sub-areas and their aggregated discharge.

use std::collections::VecDeque;

use chrono::TimeDelta;
use sf_core::{ScenarioId, ScenarioSeries, SubareaId, TimeGrid, TimeSeries, Timestamp};
use tracing::debug;

use crate::config::RunoffConfig;
use crate::error::{RunoffError, RunoffResult};
use crate::subarea::{Subarea, SubareaKind};

/// A drainage area made of homogeneous sub-areas sharing slope and width.
#[derive(Clone, Debug)]
pub struct Subcatchment {
    pub name: String,
    /// Surface slope (m/m).
    pub slope: f64,
    /// Characteristic overland-flow width (m).
    pub width: f64,
    subareas: Vec<Subarea>,
    /// Cascade evaluation order (upstream sub-areas first).
    order: Vec<usize>,
    total_flow: ScenarioSeries,
}

impl Subcatchment {
    pub fn new(
        name: impl Into<String>,
        slope: f64,
        width: f64,
        subareas: Vec<Subarea>,
    ) -> RunoffResult<Self> {
        if !(slope > 0.0 && slope.is_finite()) {
            return Err(RunoffError::InvalidArg {
                what: "subcatchment slope must be positive",
            });
        }
        if !(width > 0.0 && width.is_finite()) {
            return Err(RunoffError::InvalidArg {
                what: "characteristic width must be positive",
            });
        }
        if subareas.is_empty() {
            return Err(RunoffError::InvalidArg {
                what: "subcatchment needs at least one sub-area",
            });
        }
        let order = cascade_order(&subareas)?;
        Ok(Self {
            name: name.into(),
            slope,
            width,
            subareas,
            order,
            total_flow: ScenarioSeries::new(),
        })
    }

    /// Split a subcatchment into sub-areas from imperviousness shares.
    pub fn split(
        name: impl Into<String>,
        area: f64,
        slope: f64,
        width: f64,
        params: &SplitParams,
    ) -> RunoffResult<Self> {
        let subareas = params.subareas(area)?;
        Self::new(name, slope, width, subareas)
    }

    pub fn subareas(&self) -> &[Subarea] {
        &self.subareas
    }

    /// Total plan area (m²).
    pub fn area(&self) -> f64 {
        self.subareas.iter().map(|s| s.area).sum()
    }

    /// Start every sub-area of `scenario` dry at `t0`.
    pub fn reset(&mut self, scenario: ScenarioId, t0: Timestamp) -> RunoffResult<()> {
        for sub in &mut self.subareas {
            sub.reset(scenario, t0)?;
        }
        Ok(())
    }

    /// Advance every sub-area one step, cascading routed outflow downstream.
    ///
    /// Run-on received during `[t, t + dt]` is the routed share of the upstream
    /// sub-area's outflow at `t + dt`.
    pub fn step(
        &mut self,
        scenario: ScenarioId,
        t: Timestamp,
        dt: TimeDelta,
        rainfall: f64,
        evaporation: f64,
        cfg: &RunoffConfig,
    ) -> RunoffResult<()> {
        let mut runon = vec![0.0; self.subareas.len()];
        for &i in &self.order {
            let sub = &mut self.subareas[i];
            let state = sub.advance(
                scenario,
                t,
                dt,
                rainfall,
                evaporation,
                runon[i],
                self.slope,
                self.width,
                cfg,
            )?;

            let Some(routing) = &sub.routing else {
                continue;
            };
            let share = state.outflow * sub.area * routing.fraction / routing.to.len() as f64;
            let targets = routing.to.clone();
            for target in targets {
                let j = target.slot();
                runon[j] += share / self.subareas[j].area;
            }
        }
        Ok(())
    }

    /// Run a whole scenario on `grid`; `rainfall` must cover every step start.
    pub fn run(
        &mut self,
        scenario: ScenarioId,
        rainfall: &TimeSeries,
        evaporation: f64,
        grid: &TimeGrid,
        cfg: &RunoffConfig,
    ) -> RunoffResult<()> {
        self.reset(scenario, grid.start())?;
        let dt = TimeDelta::seconds(grid.step_seconds());
        for (t, _) in grid.steps() {
            let rain = rainfall.value_at(t)?;
            self.step(scenario, t, dt, rain, evaporation, cfg)?;
        }
        debug!(subcatchment = %self.name, %scenario, steps = grid.step_count(), "runoff complete");
        Ok(())
    }

    /// Discharge leaving the subcatchment outlet (m³/s), recomputed from the sub-areas.
    ///
    /// Each sub-area contributes `area * outlet share` of its outflow. Water a
    /// sub-area routes onto another is not counted at the source; it enters
    /// the receiver as run-on and reaches the outlet through the receiver's
    /// own outflow.
    pub fn evaluate_total_flow(
        &mut self,
        scenario: ScenarioId,
        cfg: &RunoffConfig,
    ) -> RunoffResult<TimeSeries> {
        let mut total = TimeSeries::new();
        for sub in &self.subareas {
            let history = sub.history(scenario).ok_or_else(|| sf_core::SfError::MissingData {
                what: format!("runoff of subcatchment {} for {scenario}", self.name),
            })?;
            let weight = sub.area * sub.outlet_fraction() * cfg.flow_conversion;
            total.merge_add(&history.outflow.scaled(weight));
        }
        self.total_flow.insert(scenario, total.clone());
        Ok(total)
    }

    /// Last aggregated discharge of every evaluated scenario.
    pub fn total_flow(&self) -> &ScenarioSeries {
        &self.total_flow
    }
}

/// Topological order of the sub-area cascade (Kahn's algorithm).
fn cascade_order(subareas: &[Subarea]) -> RunoffResult<Vec<usize>> {
    let n = subareas.len();
    let mut in_degree = vec![0_usize; n];
    for sub in subareas {
        if let Some(routing) = &sub.routing {
            for target in &routing.to {
                let j = target.slot();
                if j >= n {
                    return Err(RunoffError::UnknownSubarea { index: j, len: n });
                }
                in_degree[j] += 1;
            }
        }
    }

    let mut ready: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(i) = ready.pop_front() {
        order.push(i);
        if let Some(routing) = &subareas[i].routing {
            for target in &routing.to {
                let j = target.slot();
                in_degree[j] -= 1;
                if in_degree[j] == 0 {
                    ready.push_back(j);
                }
            }
        }
    }

    if order.len() != n {
        return Err(RunoffError::CyclicRouting);
    }
    Ok(order)
}

/// Surface parameters of one surface type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceParams {
    /// Depression storage (m).
    pub depression_storage: f64,
    /// Manning roughness.
    pub roughness: f64,
}

/// Internal routing between pervious and impervious surfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InternalRouting {
    #[default]
    Outlet,
    /// Route a fraction of the pervious outflow onto the impervious sub-areas.
    PerviousToImpervious { fraction: f64 },
    /// Route a fraction of the impervious outflow onto the pervious sub-area.
    ImperviousToPervious { fraction: f64 },
}

/// Imperviousness shares used by [`Subcatchment::split`].
#[derive(Clone, Debug, PartialEq)]
pub struct SplitParams {
    /// Impervious share of the total area (0..=1).
    pub impervious_fraction: f64,
    /// Share of the impervious area without depression storage (0..=1).
    pub impervious_without_storage_fraction: f64,
    pub pervious: SurfaceParams,
    pub impervious: SurfaceParams,
    pub routing: InternalRouting,
}

impl SplitParams {
    /// Build the sub-areas, skipping empty ones.
    pub fn subareas(&self, area: f64) -> RunoffResult<Vec<Subarea>> {
        for share in [self.impervious_fraction, self.impervious_without_storage_fraction] {
            if !(0.0..=1.0).contains(&share) {
                return Err(RunoffError::InvalidArg {
                    what: "imperviousness shares must be within [0, 1]",
                });
            }
        }

        let impervious = area * self.impervious_fraction;
        let without_storage = impervious * self.impervious_without_storage_fraction;
        let with_storage = impervious - without_storage;
        let pervious = area - impervious;

        let mut subareas = Vec::new();
        let mut pervious_idx = None;
        let mut impervious_idx = Vec::new();

        if pervious > 0.0 {
            pervious_idx = Some(subareas.len());
            subareas.push(Subarea::new(
                SubareaKind::Pervious {
                    depression_storage: self.pervious.depression_storage,
                },
                pervious,
                self.pervious.roughness,
            )?);
        }
        if with_storage > 0.0 {
            impervious_idx.push(subareas.len());
            subareas.push(Subarea::new(
                SubareaKind::ImperviousWithStorage {
                    depression_storage: self.impervious.depression_storage,
                },
                with_storage,
                self.impervious.roughness,
            )?);
        }
        if without_storage > 0.0 {
            impervious_idx.push(subareas.len());
            subareas.push(Subarea::new(
                SubareaKind::ImperviousWithoutStorage,
                without_storage,
                self.impervious.roughness,
            )?);
        }

        let ids = |idx: &[usize]| -> Vec<SubareaId> {
            idx.iter().map(|&i| SubareaId::from_index(i as u32)).collect()
        };

        match (self.routing, pervious_idx) {
            (InternalRouting::PerviousToImpervious { fraction }, Some(p)) => {
                let targets = ids(&impervious_idx);
                subareas[p] = subareas[p].clone().with_routing(fraction, targets)?;
            }
            (InternalRouting::ImperviousToPervious { fraction }, Some(p)) => {
                let targets = ids(&[p]);
                for &i in &impervious_idx {
                    subareas[i] = subareas[i].clone().with_routing(fraction, targets.clone())?;
                }
            }
            _ => {}
        }

        if subareas.is_empty() {
            return Err(RunoffError::InvalidArg {
                what: "subcatchment area must be positive",
            });
        }
        Ok(subareas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::time::parse_timestamp;
    use sf_core::units::mm_per_hour;

    fn t0() -> Timestamp {
        parse_timestamp("2018-01-01T00:00:00Z").unwrap()
    }

    fn params(routing: InternalRouting) -> SplitParams {
        SplitParams {
            impervious_fraction: 0.25,
            impervious_without_storage_fraction: 0.25,
            pervious: SurfaceParams {
                depression_storage: 5e-5,
                roughness: 0.1,
            },
            impervious: SurfaceParams {
                depression_storage: 5e-5,
                roughness: 0.01,
            },
            routing,
        }
    }

    #[test]
    fn split_areas_add_up() {
        let sub = Subcatchment::split("A1", 10_000.0, 0.01, 100.0, &params(InternalRouting::Outlet))
            .unwrap();
        let areas: Vec<f64> = sub.subareas().iter().map(|s| s.area).collect();
        assert_eq!(areas, vec![7_500.0, 1_875.0, 625.0]);
        assert!((sub.area() - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn fully_impervious_split_has_no_pervious() {
        let mut p = params(InternalRouting::PerviousToImpervious { fraction: 0.5 });
        p.impervious_fraction = 1.0;
        p.impervious_without_storage_fraction = 1.0;
        let subs = p.subareas(100.0).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].kind, SubareaKind::ImperviousWithoutStorage);
        assert!(subs[0].routing.is_none());
    }

    #[test]
    fn cascade_orders_upstream_first() {
        let sub = Subcatchment::split(
            "A1",
            10_000.0,
            0.01,
            100.0,
            &params(InternalRouting::ImperviousToPervious { fraction: 0.3 }),
        )
        .unwrap();
        // Pervious (index 0) receives from both impervious sub-areas
        assert_eq!(*sub.order.last().unwrap(), 0);
    }

    #[test]
    fn cyclic_routing_rejected() {
        let a = Subarea::new(SubareaKind::ImperviousWithoutStorage, 1.0, 0.01)
            .unwrap()
            .with_routing(0.5, vec![SubareaId::from_index(1)])
            .unwrap();
        let b = Subarea::new(SubareaKind::ImperviousWithoutStorage, 1.0, 0.01)
            .unwrap()
            .with_routing(0.5, vec![SubareaId::from_index(0)])
            .unwrap();
        assert!(matches!(
            Subcatchment::new("C", 0.01, 1.0, vec![a, b]).unwrap_err(),
            RunoffError::CyclicRouting
        ));
    }

    #[test]
    fn evaluate_total_flow_is_idempotent() {
        let mut sub = Subcatchment::split(
            "A1",
            10_000.0,
            0.01,
            100.0,
            &params(InternalRouting::PerviousToImpervious { fraction: 0.5 }),
        )
        .unwrap();
        let grid = TimeGrid::new(t0(), t0() + TimeDelta::minutes(30), 60).unwrap();
        let mut rain = TimeSeries::new();
        for t in grid.instants() {
            rain.set(t, mm_per_hour(30.0).value);
        }
        let cfg = RunoffConfig::default();
        let s = ScenarioId(1);
        sub.run(s, &rain, 0.0, &grid, &cfg).unwrap();

        let first = sub.evaluate_total_flow(s, &cfg).unwrap();
        let second = sub.evaluate_total_flow(s, &cfg).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), grid.len());
        assert!(first.max_value().unwrap() > 0.0);
        assert_eq!(sub.total_flow().series(s).unwrap(), &first);
    }

    #[test]
    fn missing_rainfall_is_reported() {
        let mut sub = Subcatchment::split("A1", 100.0, 0.01, 10.0, &params(InternalRouting::Outlet))
            .unwrap();
        let grid = TimeGrid::new(t0(), t0() + TimeDelta::minutes(5), 60).unwrap();
        let rain = TimeSeries::new();
        let err = sub
            .run(ScenarioId(1), &rain, 0.0, &grid, &RunoffConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            RunoffError::Core(sf_core::SfError::MissingData { .. })
        ));
    }
}

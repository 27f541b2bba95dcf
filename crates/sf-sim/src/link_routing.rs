//! Two-pass routing of one link: peak search, sizing, full propagation.

use sf_core::{ScenarioId, ScenarioSeries, TimeGrid};
use sf_hydraulics::{Conduit, PipeDesign, PipeSizingSolver};
use tracing::info;

use crate::error::{SimError, SimResult};

/// Outcome of routing one link.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutedLink {
    pub peak_discharge: f64,
    pub design: PipeDesign,
    pub downstream: ScenarioSeries,
}

/// Drives sizing and routing of conduits with a shared sizing solver.
#[derive(Clone, Copy, Debug)]
pub struct LinkRouter<'a> {
    solver: &'a PipeSizingSolver,
}

impl<'a> LinkRouter<'a> {
    pub fn new(solver: &'a PipeSizingSolver) -> Self {
        Self { solver }
    }

    /// Largest upstream discharge over every routing instant and scenario.
    ///
    /// Instants are the outer loop and scenarios the inner loop; a value equal
    /// to the running maximum replaces it.
    pub fn peak_discharge(
        what: &str,
        upstream: &ScenarioSeries,
        scenarios: &[ScenarioId],
        grid: &TimeGrid,
    ) -> SimResult<f64> {
        let mut peak = 0.0;
        for t in grid.instants() {
            for &scenario in scenarios {
                let q = upstream
                    .get(scenario)
                    .and_then(|series| series.get(t))
                    .ok_or_else(|| SimError::MissingData {
                        what: what.to_string(),
                        scenario,
                        time: t.to_rfc3339(),
                    })?;
                if q >= peak {
                    peak = q;
                }
            }
        }
        Ok(peak)
    }

    /// Size `conduit` for `peak` and fix its geometry.
    pub fn size(&self, conduit: &mut Conduit, peak: f64) -> SimResult<PipeDesign> {
        let design = self
            .solver
            .size(peak, conduit.natural_slope(), conduit.roughness)
            .map_err(|e| SimError::link(&conduit.name, e))?;
        conduit
            .apply_design(design.clone())
            .map_err(|e| SimError::link(&conduit.name, e))?;
        Ok(design)
    }

    /// Route every scenario through the sized `conduit`.
    pub fn propagate(
        conduit: &Conduit,
        upstream: &ScenarioSeries,
        scenarios: &[ScenarioId],
    ) -> SimResult<ScenarioSeries> {
        let router = conduit
            .router()
            .map_err(|e| SimError::link(&conduit.name, e))?;
        let mut downstream = ScenarioSeries::new();
        for &scenario in scenarios {
            let inflow = upstream
                .series(scenario)
                .map_err(|e| SimError::link(&conduit.name, e))?;
            let outflow = router
                .route(inflow)
                .map_err(|e| SimError::link(&conduit.name, e))?;
            downstream.insert(scenario, outflow);
        }
        Ok(downstream)
    }

    /// Peak pass, sizing and full propagation of one link.
    pub fn route(
        &self,
        conduit: &mut Conduit,
        upstream: &ScenarioSeries,
        scenarios: &[ScenarioId],
        grid: &TimeGrid,
    ) -> SimResult<RoutedLink> {
        let what = format!("upstream inflow of link {}", conduit.name);
        let peak = Self::peak_discharge(&what, upstream, scenarios, grid)?;
        let design = self.size(conduit, peak)?;
        info!(
            link = %conduit.name,
            peak,
            inner_mm = design.size.inner.value * 1_000.0,
            slope = design.slope,
            "link sized"
        );
        let downstream = Self::propagate(conduit, upstream, scenarios)?;
        Ok(RoutedLink {
            peak_discharge: peak,
            design,
            downstream,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use sf_core::time::parse_timestamp;
    use sf_core::{TimeSeries, Timestamp};

    fn t0() -> Timestamp {
        parse_timestamp("2018-01-01T00:00:00Z").unwrap()
    }

    fn series(values: &[f64]) -> TimeSeries {
        let mut ts = TimeSeries::new();
        for (k, &v) in values.iter().enumerate() {
            ts.set(t0() + TimeDelta::seconds(60 * k as i64), v);
        }
        ts
    }

    #[test]
    fn peak_spans_scenarios_and_time() {
        let grid = TimeGrid::new(t0(), t0() + TimeDelta::minutes(3), 60).unwrap();
        let mut upstream = ScenarioSeries::new();
        upstream.insert(ScenarioId(1), series(&[0.0, 0.2, 0.5, 0.1]));
        upstream.insert(ScenarioId(2), series(&[0.0, 0.7, 0.3, 0.0]));
        let peak = LinkRouter::peak_discharge(
            "test",
            &upstream,
            &[ScenarioId(1), ScenarioId(2)],
            &grid,
        )
        .unwrap();
        assert_eq!(peak, 0.7);
    }

    #[test]
    fn peak_requires_every_instant() {
        let grid = TimeGrid::new(t0(), t0() + TimeDelta::minutes(5), 60).unwrap();
        let mut upstream = ScenarioSeries::new();
        upstream.insert(ScenarioId(1), series(&[0.0, 0.2, 0.5]));
        let err =
            LinkRouter::peak_discharge("link 11", &upstream, &[ScenarioId(1)], &grid).unwrap_err();
        assert!(matches!(err, SimError::MissingData { .. }));
    }

    #[test]
    fn missing_scenario_is_reported() {
        let grid = TimeGrid::new(t0(), t0() + TimeDelta::minutes(1), 60).unwrap();
        let mut upstream = ScenarioSeries::new();
        upstream.insert(ScenarioId(1), series(&[0.0, 0.2]));
        let err =
            LinkRouter::peak_discharge("link 11", &upstream, &[ScenarioId(3)], &grid).unwrap_err();
        match err {
            SimError::MissingData { scenario, .. } => assert_eq!(scenario, ScenarioId(3)),
            other => panic!("unexpected error {other:?}"),
        }
    }
}

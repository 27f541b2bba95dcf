//! Rainfall inputs: adaptation to the runoff grid and synthetic design storms.

use sf_core::units::mm_per_hour;
use sf_core::{ScenarioId, ScenarioSeries, TimeGrid, TimeSeries};

use crate::error::{RunoffError, RunoffResult};

/// Resample a raw rainfall record onto `grid`.
///
/// Values between samples are interpolated linearly; instants outside the
/// record count as no rain.
pub fn adapt_rainfall(raw: &TimeSeries, grid: &TimeGrid) -> TimeSeries {
    let mut out = TimeSeries::new();
    for t in grid.instants() {
        out.set(t, raw.sample(t).unwrap_or(0.0));
    }
    out
}

/// Family of rectangular storms from the depth-duration curve `h = a·t^n`.
///
/// `a` is in mm/h^n and `t` in hours. Storm `k` (1-based) lasts
/// `k·horizon/count` with the constant intensity `a·t^(n-1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DesignStorms {
    pub a: f64,
    pub n: f64,
    pub count: u32,
}

impl DesignStorms {
    /// Intensity (mm/h) of a storm lasting `hours`.
    pub fn intensity_mm_per_hour(&self, hours: f64) -> f64 {
        self.a * hours.powf(self.n - 1.0)
    }

    /// One rainfall series per storm, scenarios numbered from 1.
    pub fn scenarios(&self, grid: &TimeGrid) -> RunoffResult<ScenarioSeries> {
        if self.count == 0 {
            return Err(RunoffError::InvalidArg {
                what: "design storm count must be positive",
            });
        }
        if !(self.a > 0.0) {
            return Err(RunoffError::InvalidArg {
                what: "depth-duration coefficient must be positive",
            });
        }

        let horizon_s = (grid.end() - grid.start()).num_seconds() as f64;
        let mut out = ScenarioSeries::new();
        for k in 1..=self.count {
            let duration_s = horizon_s * f64::from(k) / f64::from(self.count);
            let rate = mm_per_hour(self.intensity_mm_per_hour(duration_s / 3_600.0)).value;
            let mut series = TimeSeries::new();
            for t in grid.instants() {
                let elapsed = (t - grid.start()).num_seconds() as f64;
                series.set(t, if elapsed < duration_s { rate } else { 0.0 });
            }
            out.insert(ScenarioId(k), series);
        }
        Ok(out)
    }
}

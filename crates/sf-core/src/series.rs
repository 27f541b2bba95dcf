//! Time series keyed by timestamp, and their per-scenario partition.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::error::{SfError, SfResult};
use crate::ids::ScenarioId;
use crate::numeric::ensure_finite;
use crate::time::{TimeGrid, Timestamp};

/// Ordered mapping from timestamp to value.
///
/// Timestamps are unique; iteration is chronological.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeries {
    points: BTreeMap<Timestamp, f64>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from points, rejecting duplicate timestamps.
    pub fn from_points(points: impl IntoIterator<Item = (Timestamp, f64)>) -> SfResult<Self> {
        let mut series = Self::new();
        for (t, v) in points {
            series.insert(t, v)?;
        }
        Ok(series)
    }

    /// Insert a new finite point; a timestamp may only be written once.
    pub fn insert(&mut self, t: Timestamp, value: f64) -> SfResult<()> {
        let value = ensure_finite(value, "time series value")?;
        match self.points.entry(t) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
            Entry::Occupied(_) => Err(SfError::DuplicateTimestamp {
                what: "time series",
                time: t.to_rfc3339(),
            }),
        }
    }

    /// Insert or overwrite a point.
    pub fn set(&mut self, t: Timestamp, value: f64) {
        self.points.insert(t, value);
    }

    pub fn get(&self, t: Timestamp) -> Option<f64> {
        self.points.get(&t).copied()
    }

    /// Exact lookup; absence is a `MissingData` error.
    pub fn value_at(&self, t: Timestamp) -> SfResult<f64> {
        self.get(t).ok_or_else(|| SfError::MissingData {
            what: format!("no value at {}", t.to_rfc3339()),
        })
    }

    /// Linear interpolation between the bracketing points.
    ///
    /// Timestamps outside the covered range are `MissingData`.
    pub fn sample(&self, t: Timestamp) -> SfResult<f64> {
        if let Some(v) = self.get(t) {
            return Ok(v);
        }
        let before = self.points.range(..t).next_back();
        let after = self.points.range(t..).next();
        match (before, after) {
            (Some((&t0, &v0)), Some((&t1, &v1))) => {
                let span = (t1 - t0).num_milliseconds() as f64;
                let frac = (t - t0).num_milliseconds() as f64 / span;
                Ok(v0 + (v1 - v0) * frac)
            }
            _ => Err(SfError::MissingData {
                what: format!("{} is outside the series range", t.to_rfc3339()),
            }),
        }
    }

    /// Key-wise addition: create the point if absent, otherwise add to it.
    pub fn add_at(&mut self, t: Timestamp, value: f64) {
        *self.points.entry(t).or_insert(0.0) += value;
    }

    /// Add every point of `other` into `self`.
    pub fn merge_add(&mut self, other: &TimeSeries) {
        for (&t, &v) in &other.points {
            self.add_at(t, v);
        }
    }

    /// Sample this series on every instant of `grid`.
    pub fn resample(&self, grid: &TimeGrid) -> SfResult<TimeSeries> {
        let mut out = TimeSeries::new();
        for t in grid.instants() {
            out.set(t, self.sample(t)?);
        }
        Ok(out)
    }

    pub fn scaled(&self, factor: f64) -> TimeSeries {
        TimeSeries {
            points: self.points.iter().map(|(&t, &v)| (t, v * factor)).collect(),
        }
    }

    /// Largest value; `None` for an empty series.
    pub fn max_value(&self) -> Option<f64> {
        self.points.values().copied().reduce(f64::max)
    }

    /// Trapezoidal integral over the covered range (value·seconds).
    pub fn volume(&self) -> f64 {
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .map(|((&t0, &v0), (&t1, &v1))| {
                let dt = (t1 - t0).num_milliseconds() as f64 / 1_000.0;
                0.5 * (v0 + v1) * dt
            })
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, f64)> + '_ {
        self.points.iter().map(|(&t, &v)| (t, v))
    }

    pub fn times(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.points.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.values().copied()
    }

    pub fn first(&self) -> Option<(Timestamp, f64)> {
        self.points.first_key_value().map(|(&t, &v)| (t, v))
    }

    pub fn last(&self) -> Option<(Timestamp, f64)> {
        self.points.last_key_value().map(|(&t, &v)| (t, v))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One time series per scenario, iterated in scenario order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScenarioSeries {
    by_scenario: BTreeMap<ScenarioId, TimeSeries>,
}

impl ScenarioSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the series of one scenario.
    pub fn insert(&mut self, scenario: ScenarioId, series: TimeSeries) {
        self.by_scenario.insert(scenario, series);
    }

    pub fn get(&self, scenario: ScenarioId) -> Option<&TimeSeries> {
        self.by_scenario.get(&scenario)
    }

    /// Series of one scenario; absence is a `MissingData` error.
    pub fn series(&self, scenario: ScenarioId) -> SfResult<&TimeSeries> {
        self.get(scenario).ok_or_else(|| SfError::MissingData {
            what: format!("no series for {scenario}"),
        })
    }

    /// Mutable series of one scenario, created empty if absent.
    pub fn entry(&mut self, scenario: ScenarioId) -> &mut TimeSeries {
        self.by_scenario.entry(scenario).or_default()
    }

    pub fn value_at(&self, scenario: ScenarioId, t: Timestamp) -> SfResult<f64> {
        self.series(scenario)?
            .value_at(t)
            .map_err(|_| SfError::MissingData {
                what: format!("no value for {scenario} at {}", t.to_rfc3339()),
            })
    }

    /// Key-wise addition of a single scenario's series.
    pub fn merge_add_series(&mut self, scenario: ScenarioId, series: &TimeSeries) {
        self.entry(scenario).merge_add(series);
    }

    /// Key-wise addition of every scenario in `other`.
    pub fn merge_add(&mut self, other: &ScenarioSeries) {
        for (&scenario, series) in &other.by_scenario {
            self.merge_add_series(scenario, series);
        }
    }

    /// Largest value over all scenarios and all times.
    pub fn max_value(&self) -> Option<f64> {
        self.by_scenario
            .values()
            .filter_map(TimeSeries::max_value)
            .reduce(f64::max)
    }

    pub fn scenarios(&self) -> impl Iterator<Item = ScenarioId> + '_ {
        self.by_scenario.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScenarioId, &TimeSeries)> + '_ {
        self.by_scenario.iter().map(|(&s, ts)| (s, ts))
    }

    pub fn len(&self) -> usize {
        self.by_scenario.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_scenario.is_empty()
    }
}

impl FromIterator<(ScenarioId, TimeSeries)> for ScenarioSeries {
    fn from_iter<I: IntoIterator<Item = (ScenarioId, TimeSeries)>>(iter: I) -> Self {
        Self {
            by_scenario: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_timestamp;
    use chrono::TimeDelta;

    fn at(seconds: i64) -> Timestamp {
        parse_timestamp("2018-01-01T00:00:00Z").unwrap() + TimeDelta::seconds(seconds)
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut ts = TimeSeries::new();
        ts.insert(at(0), 1.0).unwrap();
        let err = ts.insert(at(0), 2.0).unwrap_err();
        assert!(matches!(err, SfError::DuplicateTimestamp { .. }));
        assert_eq!(ts.get(at(0)), Some(1.0));
    }

    #[test]
    fn insert_rejects_non_finite() {
        let mut ts = TimeSeries::new();
        let err = ts.insert(at(0), f64::NAN).unwrap_err();
        assert!(matches!(err, SfError::NonFinite { .. }));
        assert!(ts.is_empty());
    }

    #[test]
    fn iteration_is_chronological() {
        let ts = TimeSeries::from_points([(at(120), 3.0), (at(0), 1.0), (at(60), 2.0)]).unwrap();
        let values: Vec<f64> = ts.values().collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn value_at_reports_missing() {
        let ts = TimeSeries::from_points([(at(0), 1.0)]).unwrap();
        assert!(matches!(
            ts.value_at(at(30)),
            Err(SfError::MissingData { .. })
        ));
    }

    #[test]
    fn sample_interpolates_inside_range_only() {
        let ts = TimeSeries::from_points([(at(0), 0.0), (at(60), 6.0)]).unwrap();
        assert!((ts.sample(at(30)).unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(ts.sample(at(60)).unwrap(), 6.0);
        assert!(ts.sample(at(90)).is_err());
    }

    #[test]
    fn add_at_creates_then_sums() {
        let mut ts = TimeSeries::new();
        ts.add_at(at(0), 1.5);
        ts.add_at(at(0), 2.0);
        assert_eq!(ts.get(at(0)), Some(3.5));
    }

    #[test]
    fn resample_on_finer_grid() {
        let ts = TimeSeries::from_points([(at(0), 0.0), (at(60), 1.0), (at(120), 0.0)]).unwrap();
        let grid = TimeGrid::new(at(0), at(120), 30).unwrap();
        let fine = ts.resample(&grid).unwrap();
        let values: Vec<f64> = fine.values().collect();
        assert_eq!(values, vec![0.0, 0.5, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn volume_is_trapezoidal() {
        let ts = TimeSeries::from_points([(at(0), 0.0), (at(10), 2.0), (at(20), 2.0)]).unwrap();
        assert!((ts.volume() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn scenario_series_missing_scenario() {
        let series = ScenarioSeries::new();
        assert!(matches!(
            series.series(ScenarioId(1)),
            Err(SfError::MissingData { .. })
        ));
    }

    #[test]
    fn scenario_series_max_spans_scenarios() {
        let mut series = ScenarioSeries::new();
        series.insert(
            ScenarioId(1),
            TimeSeries::from_points([(at(0), 1.0), (at(60), 4.0)]).unwrap(),
        );
        series.insert(
            ScenarioId(2),
            TimeSeries::from_points([(at(0), 5.0), (at(60), 2.0)]).unwrap(),
        );
        assert_eq!(series.max_value(), Some(5.0));
    }
}

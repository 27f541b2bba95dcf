//! Simulation time axis.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{SfError, SfResult};

/// Absolute simulation timestamp (UTC).
pub type Timestamp = DateTime<Utc>;

/// Parse an RFC 3339 timestamp such as `2018-01-01T00:00:00Z`.
pub fn parse_timestamp(text: &str) -> SfResult<Timestamp> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| SfError::InvalidArg {
            what: "timestamp is not RFC 3339",
        })
}

/// Fixed-step time axis from `start` to `end`.
///
/// Instants are `start + k·step` for every `k` with the instant `<= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeGrid {
    start: Timestamp,
    end: Timestamp,
    step_s: i64,
}

impl TimeGrid {
    pub fn new(start: Timestamp, end: Timestamp, step_s: i64) -> SfResult<Self> {
        if step_s <= 0 {
            return Err(SfError::InvalidArg {
                what: "time step must be positive",
            });
        }
        if end < start {
            return Err(SfError::InvalidArg {
                what: "end time precedes start time",
            });
        }
        Ok(Self { start, end, step_s })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn step_seconds(&self) -> i64 {
        self.step_s
    }

    /// Number of whole steps that fit in the horizon.
    pub fn step_count(&self) -> usize {
        ((self.end - self.start).num_seconds() / self.step_s) as usize
    }

    /// Number of instants (`step_count + 1`).
    pub fn len(&self) -> usize {
        self.step_count() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The k-th instant.
    pub fn at(&self, k: usize) -> Timestamp {
        self.start + TimeDelta::seconds(self.step_s * k as i64)
    }

    /// Last instant on the grid (may be before `end` when the horizon is not a multiple of the step).
    pub fn last(&self) -> Timestamp {
        self.at(self.step_count())
    }

    /// All instants in chronological order.
    pub fn instants(&self) -> impl Iterator<Item = Timestamp> + '_ {
        (0..self.len()).map(move |k| self.at(k))
    }

    /// All `(t, t + step)` pairs covered by the horizon.
    pub fn steps(&self) -> impl Iterator<Item = (Timestamp, Timestamp)> + '_ {
        (0..self.step_count()).map(move |k| (self.at(k), self.at(k + 1)))
    }
}

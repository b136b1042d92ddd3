//! Interval persistence
//!
//! Storage is an explicit seam: monitors receive a store handle at
//! construction rather than reaching for a global database. Operations
//! return `Result` so the caller owns the failure policy instead of the
//! store swallowing errors.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::MonitorError;
use crate::types::SleepInterval;

/// Days of interval history kept by the retention sweep
pub const RETENTION_DAYS: i64 = 7;

/// Storage seam for recorded sleep intervals
pub trait IntervalStore {
    /// Persist one interval
    fn insert(&mut self, interval: SleepInterval) -> Result<(), MonitorError>;

    /// Intervals with `start_time` in `[start, end)`, ordered by start time
    fn intervals_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<SleepInterval>, MonitorError>;

    /// All stored intervals, ordered by start time
    fn all(&self) -> Result<Vec<SleepInterval>, MonitorError>;

    /// Delete intervals with `start_time` before `cutoff`; returns the
    /// number removed
    fn delete_before(&mut self, cutoff: NaiveDateTime) -> Result<u64, MonitorError>;
}

/// Retention sweep: drop intervals older than [`RETENTION_DAYS`], measured
/// from midnight of `today`. Runs outside of aggregation.
pub fn sweep_old_intervals<S: IntervalStore>(
    store: &mut S,
    today: NaiveDate,
) -> Result<u64, MonitorError> {
    let cutoff = (today - Duration::days(RETENTION_DAYS))
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| MonitorError::DateParse("invalid retention cutoff".to_string()))?;
    store.delete_before(cutoff)
}

/// In-memory interval store with JSON round-tripping for app-private
/// persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryIntervalStore {
    intervals: Vec<SleepInterval>,
}

impl MemoryIntervalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored intervals
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Serialize the store contents to JSON
    pub fn to_json(&self) -> Result<String, MonitorError> {
        serde_json::to_string(&self.intervals).map_err(MonitorError::Json)
    }

    /// Load a store from JSON. Corrupt input is surfaced as a parse error;
    /// callers wanting the original "treat as empty history" behavior make
    /// that choice explicitly.
    pub fn from_json(json: &str) -> Result<Self, MonitorError> {
        let intervals: Vec<SleepInterval> =
            serde_json::from_str(json).map_err(|e| MonitorError::Parse(e.to_string()))?;
        Ok(Self { intervals })
    }
}

impl IntervalStore for MemoryIntervalStore {
    fn insert(&mut self, interval: SleepInterval) -> Result<(), MonitorError> {
        if interval.end_time < interval.start_time {
            return Err(MonitorError::InvalidInterval(format!(
                "end {} before start {}",
                interval.end_time, interval.start_time
            )));
        }
        self.intervals.push(interval);
        Ok(())
    }

    fn intervals_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<SleepInterval>, MonitorError> {
        let mut matched: Vec<SleepInterval> = self
            .intervals
            .iter()
            .filter(|i| i.start_time >= start && i.start_time < end)
            .cloned()
            .collect();
        matched.sort_by_key(|i| i.start_time);
        Ok(matched)
    }

    fn all(&self) -> Result<Vec<SleepInterval>, MonitorError> {
        let mut all = self.intervals.clone();
        all.sort_by_key(|i| i.start_time);
        Ok(all)
    }

    fn delete_before(&mut self, cutoff: NaiveDateTime) -> Result<u64, MonitorError> {
        let before = self.intervals.len();
        self.intervals.retain(|i| i.start_time >= cutoff);
        Ok((before - self.intervals.len()) as u64)
    }
}

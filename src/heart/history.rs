//! Measurement history
//!
//! Append-only list of heart rate measurements, pruned by age and by count
//! on every append, with running min/max for the graph axis.

use chrono::{Duration, NaiveDateTime};

use crate::heart::types::{HeartRateMeasurement, HIGH_INTENSITY_THRESHOLD, RESTING_THRESHOLD};

/// Measurements older than this are pruned (hours)
pub const MAX_MEASUREMENT_AGE_HOURS: i64 = 24;

/// At most this many measurements are retained
pub const MAX_MEASUREMENTS: usize = 24;

/// Axis floor when no data is present (bpm)
pub const DEFAULT_MIN_VALUE: i32 = RESTING_THRESHOLD;

/// Axis ceiling when no data is present (bpm)
pub const DEFAULT_MAX_VALUE: i32 = HIGH_INTENSITY_THRESHOLD;

/// Bounded heart rate measurement history.
#[derive(Debug, Clone)]
pub struct HeartRateHistory {
    measurements: Vec<HeartRateMeasurement>,
    min_value: i32,
    max_value: i32,
}

impl Default for HeartRateHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HeartRateHistory {
    pub fn new() -> Self {
        Self {
            measurements: Vec::new(),
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
        }
    }

    /// Restore a previously persisted measurement list.
    pub fn from_measurements(measurements: Vec<HeartRateMeasurement>) -> Self {
        let mut history = Self::new();
        history.measurements = measurements;
        history.update_min_max();
        history
    }

    /// Append a measurement taken at `now`, pruning stale and surplus
    /// entries.
    pub fn add(&mut self, value: i32, now: NaiveDateTime) {
        self.measurements
            .push(HeartRateMeasurement::new(value, now));
        self.prune(now);
        self.update_min_max();
    }

    /// All retained measurements, oldest first
    pub fn measurements(&self) -> &[HeartRateMeasurement] {
        &self.measurements
    }

    /// Measurements taken on the calendar day of `now`
    pub fn today(&self, now: NaiveDateTime) -> Vec<HeartRateMeasurement> {
        self.measurements
            .iter()
            .filter(|m| m.timestamp.date() == now.date())
            .copied()
            .collect()
    }

    /// Smallest retained value, or the default axis floor when empty
    pub fn min_value(&self) -> i32 {
        self.min_value
    }

    /// Largest retained value, or the default axis ceiling when empty
    pub fn max_value(&self) -> i32 {
        self.max_value
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Drop all measurements and reset the axis bounds.
    pub fn clear(&mut self) {
        self.measurements.clear();
        self.min_value = DEFAULT_MIN_VALUE;
        self.max_value = DEFAULT_MAX_VALUE;
    }

    fn prune(&mut self, now: NaiveDateTime) {
        let cutoff = now - Duration::hours(MAX_MEASUREMENT_AGE_HOURS);
        self.measurements.retain(|m| m.timestamp > cutoff);

        if self.measurements.len() > MAX_MEASUREMENTS {
            let excess = self.measurements.len() - MAX_MEASUREMENTS;
            self.measurements.drain(..excess);
        }
    }

    fn update_min_max(&mut self) {
        if self.measurements.is_empty() {
            self.min_value = DEFAULT_MIN_VALUE;
            self.max_value = DEFAULT_MAX_VALUE;
            return;
        }
        self.min_value = self.measurements.iter().map(|m| m.value).min().unwrap_or(DEFAULT_MIN_VALUE);
        self.max_value = self.measurements.iter().map(|m| m.value).max().unwrap_or(DEFAULT_MAX_VALUE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let history = HeartRateHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.min_value(), 60);
        assert_eq!(history.max_value(), 143);
    }

    #[test]
    fn test_min_max_track_data() {
        let mut history = HeartRateHistory::new();
        history.add(72, noon());
        history.add(55, noon() + Duration::minutes(5));
        history.add(120, noon() + Duration::minutes(10));

        assert_eq!(history.min_value(), 55);
        assert_eq!(history.max_value(), 120);
    }

    #[test]
    fn test_prune_by_age() {
        let mut history = HeartRateHistory::new();
        history.add(80, noon() - Duration::hours(30));
        history.add(70, noon());

        assert_eq!(history.measurements().len(), 1);
        assert_eq!(history.measurements()[0].value, 70);
    }

    #[test]
    fn test_prune_by_count_keeps_newest() {
        let mut history = HeartRateHistory::new();
        for i in 0..30 {
            history.add(60 + i, noon() + Duration::minutes(i as i64));
        }

        assert_eq!(history.measurements().len(), MAX_MEASUREMENTS);
        // Oldest entries were dropped
        assert_eq!(history.measurements()[0].value, 66);
        assert_eq!(history.measurements().last().unwrap().value, 89);
    }

    #[test]
    fn test_today_filter() {
        let mut history = HeartRateHistory::new();
        history.add(65, noon() - Duration::hours(14)); // previous day, 22:00
        history.add(75, noon());

        let today = history.today(noon());
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].value, 75);
    }

    #[test]
    fn test_clear_resets_bounds() {
        let mut history = HeartRateHistory::new();
        history.add(45, noon());
        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.min_value(), DEFAULT_MIN_VALUE);
        assert_eq!(history.max_value(), DEFAULT_MAX_VALUE);
    }

    #[test]
    fn test_restore_from_persisted() {
        let measurements = vec![
            HeartRateMeasurement::new(50, noon()),
            HeartRateMeasurement::new(90, noon() + Duration::minutes(1)),
        ];
        let history = HeartRateHistory::from_measurements(measurements);
        assert_eq!(history.min_value(), 50);
        assert_eq!(history.max_value(), 90);
    }
}

//! Measurement persistence
//!
//! The original app keeps measurements as one serialized JSON list under a
//! key-value store. The trait keeps that shape: save the whole list,
//! load the whole list. Failures surface as explicit errors; the caller
//! decides whether to fall back to an empty history.

use crate::error::MonitorError;
use crate::heart::types::HeartRateMeasurement;

/// Storage seam for the heart rate measurement list
pub trait MeasurementStore {
    /// Replace the stored measurement list
    fn save(&mut self, measurements: &[HeartRateMeasurement]) -> Result<(), MonitorError>;

    /// Load the stored measurement list; empty when nothing was saved yet
    fn load(&self) -> Result<Vec<HeartRateMeasurement>, MonitorError>;
}

/// In-memory key-value measurement store holding one serialized JSON list.
#[derive(Debug, Clone, Default)]
pub struct MemoryMeasurementStore {
    serialized: Option<String>,
}

impl MemoryMeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw serialized content (restoring app-private
    /// state, or simulating corruption in tests)
    pub fn with_serialized(serialized: String) -> Self {
        Self {
            serialized: Some(serialized),
        }
    }
}

impl MeasurementStore for MemoryMeasurementStore {
    fn save(&mut self, measurements: &[HeartRateMeasurement]) -> Result<(), MonitorError> {
        self.serialized = Some(serde_json::to_string(measurements)?);
        Ok(())
    }

    fn load(&self) -> Result<Vec<HeartRateMeasurement>, MonitorError> {
        match &self.serialized {
            None => Ok(Vec::new()),
            Some(json) => {
                serde_json::from_str(json).map_err(|e| MonitorError::Parse(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn measurement(value: i32) -> HeartRateMeasurement {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        HeartRateMeasurement::new(value, ts)
    }

    #[test]
    fn test_empty_store_loads_empty() {
        let store = MemoryMeasurementStore::new();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryMeasurementStore::new();
        let measurements = vec![measurement(72), measurement(75)];
        store.save(&measurements).unwrap();

        assert_eq!(store.load().unwrap(), measurements);
    }

    #[test]
    fn test_corrupt_content_is_explicit_parse_error() {
        let store = MemoryMeasurementStore::with_serialized("{broken".to_string());
        assert!(matches!(store.load(), Err(MonitorError::Parse(_))));
    }
}

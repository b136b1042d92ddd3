//! Heart rate data types and zone classification

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Heart rates above this are classified as high intensity (bpm, exclusive)
pub const HIGH_INTENSITY_THRESHOLD: i32 = 143;

/// Heart rates below this are classified as resting (bpm, exclusive)
pub const RESTING_THRESHOLD: i32 = 60;

/// A single heart rate measurement. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateMeasurement {
    /// Heart rate in beats per minute
    pub value: i32,
    /// When the measurement was taken (wall clock)
    pub timestamp: NaiveDateTime,
}

impl HeartRateMeasurement {
    pub fn new(value: i32, timestamp: NaiveDateTime) -> Self {
        Self { value, timestamp }
    }

    /// Time-of-day of the measurement
    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }
}

/// Heart rate intensity zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartRateZone {
    Resting,
    Normal,
    HighIntensity,
}

impl HeartRateZone {
    /// Display label for the zone
    pub fn as_str(&self) -> &'static str {
        match self {
            HeartRateZone::Resting => "Resting",
            HeartRateZone::Normal => "Normal",
            HeartRateZone::HighIntensity => "High Intensity",
        }
    }
}

/// Classify a heart rate into its intensity zone. Pure and stateless,
/// recomputed on every reading.
pub fn zone_for(heart_rate: i32) -> HeartRateZone {
    if heart_rate > HIGH_INTENSITY_THRESHOLD {
        HeartRateZone::HighIntensity
    } else if heart_rate < RESTING_THRESHOLD {
        HeartRateZone::Resting
    } else {
        HeartRateZone::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zone_examples() {
        assert_eq!(zone_for(150).as_str(), "High Intensity");
        assert_eq!(zone_for(55).as_str(), "Resting");
        assert_eq!(zone_for(100).as_str(), "Normal");
    }

    #[test]
    fn test_zone_boundaries_are_exclusive() {
        assert_eq!(zone_for(143), HeartRateZone::Normal);
        assert_eq!(zone_for(144), HeartRateZone::HighIntensity);
        assert_eq!(zone_for(60), HeartRateZone::Normal);
        assert_eq!(zone_for(59), HeartRateZone::Resting);
    }

    #[test]
    fn test_measurement_serialization() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let measurement = HeartRateMeasurement::new(72, ts);

        let json = serde_json::to_string(&measurement).unwrap();
        let parsed: HeartRateMeasurement = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, measurement);
    }
}

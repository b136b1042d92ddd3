//! Sleep phase classification
//!
//! Pure rule table over two scalars: minutes since the last detected
//! movement, and the current heart rate. Evaluated on a fixed cadence while
//! wall-clock time falls inside the monitoring window.

use chrono::NaiveTime;

use crate::types::SleepPhase;

/// Cadence of classifier evaluation while monitoring
pub const TICK_INTERVAL_MINUTES: i64 = 5;

/// Movement recency bound for the awake rule (minutes)
pub const AWAKE_MOVEMENT_MINUTES: f64 = 5.0;
/// Heart rate floor for the awake rule (bpm, exclusive)
pub const AWAKE_MIN_HR: i32 = 70;

/// Movement recency bound for the light sleep rule (minutes)
pub const LIGHT_MOVEMENT_MINUTES: f64 = 20.0;
/// Inclusive heart rate band for light sleep (bpm)
pub const LIGHT_HR_RANGE: (i32, i32) = (50, 70);

/// Movement recency bound for the deep sleep rule (minutes)
pub const DEEP_MOVEMENT_MINUTES: f64 = 40.0;
/// Heart rate ceiling for deep sleep (bpm, exclusive)
pub const DEEP_MAX_HR: i32 = 50;

/// Classify the current sleep phase from movement recency and heart rate.
///
/// Rules are tried in order and the first match wins; the fall-through is
/// REM, so the function is total.
pub fn classify_phase(minutes_since_movement: f64, heart_rate: i32) -> SleepPhase {
    if minutes_since_movement < AWAKE_MOVEMENT_MINUTES && heart_rate > AWAKE_MIN_HR {
        SleepPhase::Awake
    } else if minutes_since_movement < LIGHT_MOVEMENT_MINUTES
        && heart_rate >= LIGHT_HR_RANGE.0
        && heart_rate <= LIGHT_HR_RANGE.1
    {
        SleepPhase::LightSleep
    } else if minutes_since_movement < DEEP_MOVEMENT_MINUTES && heart_rate < DEEP_MAX_HR {
        SleepPhase::DeepSleep
    } else {
        SleepPhase::Rem
    }
}

/// Start of the nightly monitoring window (exclusive)
pub fn window_open() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 0, 0).unwrap()
}

/// End of the nightly monitoring window (exclusive)
pub fn window_close() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap()
}

/// Earliest time at which a sustained awake phase halts monitoring (exclusive)
pub fn halt_earliest() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap()
}

/// Whether wall-clock time falls inside the monitoring window
/// (after 23:00 or before 12:00).
pub fn in_monitoring_window(time: NaiveTime) -> bool {
    time > window_open() || time < window_close()
}

/// Whether monitoring should halt: the wearer is awake and the clock has
/// moved into the 07:00-12:00 morning window.
pub fn should_halt(time: NaiveTime, phase: SleepPhase) -> bool {
    time > halt_earliest() && time < window_close() && phase == SleepPhase::Awake
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_awake() {
        assert_eq!(classify_phase(2.0, 80), SleepPhase::Awake);
    }

    #[test]
    fn test_classify_light_sleep() {
        assert_eq!(classify_phase(15.0, 60), SleepPhase::LightSleep);
        // Band bounds are inclusive
        assert_eq!(classify_phase(15.0, 50), SleepPhase::LightSleep);
        assert_eq!(classify_phase(15.0, 70), SleepPhase::LightSleep);
    }

    #[test]
    fn test_classify_deep_sleep() {
        assert_eq!(classify_phase(30.0, 45), SleepPhase::DeepSleep);
    }

    #[test]
    fn test_classify_rem_fall_through() {
        assert_eq!(classify_phase(100.0, 45), SleepPhase::Rem);
        // High heart rate with stale movement also falls through
        assert_eq!(classify_phase(25.0, 80), SleepPhase::Rem);
    }

    #[test]
    fn test_classifier_is_total() {
        // Spot-check a grid of inputs; every pair must classify
        for movement in [0.0, 4.9, 5.0, 19.9, 20.0, 39.9, 40.0, 500.0] {
            for hr in [0, 30, 49, 50, 60, 70, 71, 150, 299] {
                let _ = classify_phase(movement, hr);
            }
        }
    }

    #[test]
    fn test_monitoring_window() {
        assert!(in_monitoring_window(NaiveTime::from_hms_opt(23, 30, 0).unwrap()));
        assert!(in_monitoring_window(NaiveTime::from_hms_opt(2, 0, 0).unwrap()));
        assert!(in_monitoring_window(NaiveTime::from_hms_opt(11, 59, 0).unwrap()));
        assert!(!in_monitoring_window(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
        assert!(!in_monitoring_window(NaiveTime::from_hms_opt(15, 0, 0).unwrap()));
        assert!(!in_monitoring_window(NaiveTime::from_hms_opt(22, 59, 0).unwrap()));
    }

    #[test]
    fn test_should_halt() {
        let morning = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert!(should_halt(morning, SleepPhase::Awake));
        assert!(!should_halt(morning, SleepPhase::LightSleep));

        // Before 07:00 the wearer may still fall back asleep
        let night = NaiveTime::from_hms_opt(3, 0, 0).unwrap();
        assert!(!should_halt(night, SleepPhase::Awake));

        // Past noon the window is closed anyway
        let afternoon = NaiveTime::from_hms_opt(13, 0, 0).unwrap();
        assert!(!should_halt(afternoon, SleepPhase::Awake));
    }
}

//! Sensor adaptation
//!
//! Platform sensor callbacks are adapted into plain values the monitoring
//! loop can poll: a movement-recency clock derived from accelerometer
//! deltas, and a validity-gated latest heart rate. The hardware itself is
//! an external collaborator; callers feed samples in.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Sum of per-axis acceleration deltas above which a sample counts as
/// movement
pub const MOVEMENT_THRESHOLD: f32 = 0.8;

/// Heart rate readings at or above this are discarded as sensor noise (bpm)
pub const MAX_VALID_HR: i32 = 300;

/// Minimum spacing between accepted heart rate readings (milliseconds)
pub const HR_UPDATE_INTERVAL_MS: i64 = 1000;

/// One raw sensor sample as delivered by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSample {
    /// Sample timestamp (wall clock)
    pub timestamp: NaiveDateTime,
    /// Raw heart rate reading, if this sample carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_bpm: Option<f64>,
    /// Raw accelerometer vector, if this sample carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accel: Option<[f32; 3]>,
}

/// Sensor and permission availability, surfaced as state rather than errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorStatus {
    /// A heart rate sensor was found on the device
    pub sensor_available: bool,
    /// The body-sensors permission has been granted
    pub permission_granted: bool,
}

impl SensorStatus {
    pub fn available() -> Self {
        Self {
            sensor_available: true,
            permission_granted: true,
        }
    }
}

/// Derives time-since-last-movement from accelerometer samples.
///
/// A sample counts as movement when the summed per-axis delta against the
/// previous sample exceeds [`MOVEMENT_THRESHOLD`].
#[derive(Debug, Clone)]
pub struct MotionDetector {
    last_accel: [f32; 3],
    last_movement: NaiveDateTime,
    movement_detected: bool,
}

impl MotionDetector {
    /// Start the detector at `now`; the wearer counts as having just moved.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            last_accel: [0.0, 0.0, 0.0],
            last_movement: now,
            movement_detected: false,
        }
    }

    /// Feed one accelerometer sample. Returns whether it counted as
    /// movement.
    pub fn process_sample(&mut self, accel: [f32; 3], now: NaiveDateTime) -> bool {
        let delta: f32 = accel
            .iter()
            .zip(self.last_accel.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        self.last_accel = accel;

        self.movement_detected = delta > MOVEMENT_THRESHOLD;
        if self.movement_detected {
            self.last_movement = now;
        }
        self.movement_detected
    }

    /// Whether the most recent sample counted as movement
    pub fn movement_detected(&self) -> bool {
        self.movement_detected
    }

    /// Minutes elapsed since the last detected movement
    pub fn minutes_since_movement(&self, now: NaiveDateTime) -> f64 {
        (now - self.last_movement).num_seconds().max(0) as f64 / 60.0
    }
}

/// Validity gate over raw heart rate readings.
///
/// Accepts a reading only when it is physiologically plausible
/// (0 < bpm < 300) and at least one second has passed since the previously
/// accepted reading; retains the latest accepted value.
#[derive(Debug, Clone, Default)]
pub struct HeartRateGate {
    latest: Option<i32>,
    last_update: Option<NaiveDateTime>,
}

impl HeartRateGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a raw reading; returns the accepted value, or `None` if the
    /// reading was rejected.
    pub fn accept(&mut self, bpm: f64, now: NaiveDateTime) -> Option<i32> {
        let value = bpm as i32;
        if value <= 0 || value >= MAX_VALID_HR {
            return None;
        }

        if let Some(last) = self.last_update {
            if (now - last).num_milliseconds() < HR_UPDATE_INTERVAL_MS {
                return None;
            }
        }

        self.latest = Some(value);
        self.last_update = Some(now);
        Some(value)
    }

    /// Latest accepted heart rate, if any reading has passed the gate
    pub fn latest(&self) -> Option<i32> {
        self.latest
    }
}

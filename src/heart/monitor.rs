//! Heart rate background monitor
//!
//! Idle -> Monitoring -> Idle over validity-gated sensor readings. While
//! monitoring, accepted readings accumulate in a small buffer whose average
//! is appended to the history, keeping the persisted series smooth and the
//! write rate low.

use chrono::NaiveDateTime;
use log::warn;

use crate::error::MonitorError;
use crate::heart::history::HeartRateHistory;
use crate::heart::store::MeasurementStore;
use crate::heart::types::{zone_for, HeartRateZone};
use crate::sensors::{HeartRateGate, SensorStatus};
use crate::types::MonitorState;

/// Minutes to accumulate readings before a save is forced
pub const BUFFER_TIME_MINUTES: i64 = 5;

/// Minimum buffered readings needed to compute a saved average
pub const MIN_MEASUREMENTS_TO_SAVE: usize = 3;

/// Latest-value summary published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartSummary {
    pub heart_rate: Option<i32>,
    pub zone: Option<HeartRateZone>,
    pub is_monitoring: bool,
    pub sensor_available: bool,
    pub min_value: i32,
    pub max_value: i32,
}

/// Background heart rate monitor over an injected measurement store.
pub struct HeartRateMonitor<S: MeasurementStore> {
    store: S,
    status: SensorStatus,
    state: MonitorState,
    gate: HeartRateGate,
    history: HeartRateHistory,
    buffer: Vec<i32>,
    last_save: Option<NaiveDateTime>,
    dropped_writes: u64,
}

impl<S: MeasurementStore> HeartRateMonitor<S> {
    /// Create an idle monitor, restoring any persisted history.
    ///
    /// Corrupt stored data is treated as an empty history; the fallback is
    /// made here, not hidden inside the store.
    pub fn new(store: S, status: SensorStatus) -> Self {
        let history = match store.load() {
            Ok(measurements) => HeartRateHistory::from_measurements(measurements),
            Err(e) => {
                warn!("discarding unreadable heart rate history: {e}");
                HeartRateHistory::new()
            }
        };

        Self {
            store,
            status,
            state: MonitorState::Idle,
            gate: HeartRateGate::new(),
            history,
            buffer: Vec::new(),
            last_save: None,
            dropped_writes: 0,
        }
    }

    /// Begin monitoring.
    ///
    /// Refused when no heart rate sensor is present or the body-sensors
    /// permission is missing; the monitor stays idle in both cases.
    pub fn start(&mut self, now: NaiveDateTime) -> Result<(), MonitorError> {
        if self.state == MonitorState::Monitoring {
            return Ok(());
        }
        if !self.status.sensor_available {
            return Err(MonitorError::SensorUnavailable);
        }
        if !self.status.permission_granted {
            return Err(MonitorError::PermissionDenied);
        }

        self.state = MonitorState::Monitoring;
        self.last_save = Some(now);
        Ok(())
    }

    /// Stop monitoring, flushing any pending buffered readings.
    pub fn stop(&mut self, now: NaiveDateTime) {
        if self.state == MonitorState::Monitoring {
            self.flush_buffer(now);
        }
        self.buffer.clear();
        self.state = MonitorState::Idle;
    }

    /// Toggle between Idle and Monitoring; returns whether the monitor is
    /// now running.
    pub fn toggle(&mut self, now: NaiveDateTime) -> Result<bool, MonitorError> {
        if self.state == MonitorState::Monitoring {
            self.stop(now);
            Ok(false)
        } else {
            self.start(now)?;
            Ok(true)
        }
    }

    /// Feed one raw sensor reading.
    ///
    /// Invalid or too-frequent readings are dropped by the gate; accepted
    /// readings are buffered and periodically averaged into the history.
    pub fn record(&mut self, bpm: f64, now: NaiveDateTime) {
        if self.state != MonitorState::Monitoring {
            return;
        }
        let Some(value) = self.gate.accept(bpm, now) else {
            return;
        };

        self.buffer.push(value);

        let buffer_elapsed = self
            .last_save
            .map(|t| (now - t).num_minutes() >= BUFFER_TIME_MINUTES)
            .unwrap_or(true);
        if buffer_elapsed || self.buffer.len() >= MIN_MEASUREMENTS_TO_SAVE {
            self.flush_buffer(now);
        }
    }

    /// Latest accepted heart rate
    pub fn heart_rate(&self) -> Option<i32> {
        self.gate.latest()
    }

    /// Zone of the latest accepted heart rate
    pub fn zone(&self) -> Option<HeartRateZone> {
        self.gate.latest().map(zone_for)
    }

    /// The measurement history (for rendering)
    pub fn history(&self) -> &HeartRateHistory {
        &self.history
    }

    /// Drop the recorded history, in memory and in the store.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
    }

    /// Latest published state snapshot.
    pub fn summary(&self) -> HeartSummary {
        HeartSummary {
            heart_rate: self.heart_rate(),
            zone: self.zone(),
            is_monitoring: self.state == MonitorState::Monitoring,
            sensor_available: self.status.sensor_available,
            min_value: self.history.min_value(),
            max_value: self.history.max_value(),
        }
    }

    /// Measurement saves dropped due to storage failures
    pub fn dropped_writes(&self) -> u64 {
        self.dropped_writes
    }

    pub fn is_monitoring(&self) -> bool {
        self.state == MonitorState::Monitoring
    }

    // Average the buffer into one history entry when it holds enough
    // readings; smaller buffers wait for more data.
    fn flush_buffer(&mut self, now: NaiveDateTime) {
        if self.buffer.len() < MIN_MEASUREMENTS_TO_SAVE {
            return;
        }

        let average =
            (self.buffer.iter().map(|v| *v as i64).sum::<i64>() / self.buffer.len() as i64) as i32;
        self.history.add(average, now);
        self.buffer.clear();
        self.last_save = Some(now);
        self.persist_history();
    }

    // Best-effort persistence: a failed save is logged and dropped.
    fn persist_history(&mut self) {
        if let Err(e) = self.store.save(self.history.measurements()) {
            self.dropped_writes += 1;
            warn!("dropping heart rate history save after storage failure: {e}");
        }
    }
}

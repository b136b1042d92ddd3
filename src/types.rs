//! Core types for the sleep monitoring pipeline
//!
//! This module defines the data structures that flow through the monitoring
//! loop: classified phases, recorded intervals, and daily summaries.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sleep phase classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepPhase {
    Awake,
    LightSleep,
    DeepSleep,
    Rem,
}

impl SleepPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SleepPhase::Awake => "awake",
            SleepPhase::LightSleep => "light_sleep",
            SleepPhase::DeepSleep => "deep_sleep",
            SleepPhase::Rem => "rem",
        }
    }

    /// Whether this phase counts toward total sleep time
    pub fn is_sleep(&self) -> bool {
        *self != SleepPhase::Awake
    }
}

/// A recorded sleep interval: one contiguous run of a single phase.
///
/// Immutable once created; `duration_minutes` is derived from the bounds
/// at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepInterval {
    /// Unique interval identifier
    pub id: Uuid,
    /// Phase held over the interval
    pub phase: SleepPhase,
    /// Interval start (wall clock)
    pub start_time: NaiveDateTime,
    /// Interval end (wall clock, exclusive)
    pub end_time: NaiveDateTime,
    /// Derived duration in whole minutes
    pub duration_minutes: i64,
}

impl SleepInterval {
    /// Create an interval, deriving the duration from its bounds.
    pub fn new(phase: SleepPhase, start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        let duration_minutes = (end_time - start_time).num_minutes();
        Self {
            id: Uuid::new_v4(),
            phase,
            start_time,
            end_time,
            duration_minutes,
        }
    }
}

/// One calendar day of recorded sleep, grouped under the diary convention
/// (a "night" runs 23:00 through 06:00 the next day).
///
/// Computed on read, never persisted; recomputed whenever the underlying
/// intervals change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    /// Diary date the night is attributed to
    pub date: NaiveDate,
    /// Intervals of the night, ordered by start time
    pub intervals: Vec<SleepInterval>,
    /// Total minutes spent in any non-awake phase
    pub total_sleep_minutes: i64,
    /// Heuristic sleep quality score (0-100)
    pub score: u8,
}

/// Monitoring state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    Idle,
    Monitoring,
}

/// External events delivered to a monitor.
///
/// Platform lifecycle callbacks (service start/stop, tracking toggle) are
/// modeled as explicit events rather than implicit callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    Start,
    Stop,
    SetTracking(bool),
}

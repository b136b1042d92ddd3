//! Cycle recording
//!
//! The recorder turns a stream of classified phases into sleep intervals:
//! one interval per contiguous run of an identical phase. The open tail run
//! is only closed on an explicit flush (monitoring stop or teardown).

use chrono::NaiveDateTime;

use crate::types::{SleepInterval, SleepPhase};

/// Tracks the held phase and emits an interval on every phase transition.
#[derive(Debug, Clone)]
pub struct CycleRecorder {
    current_phase: SleepPhase,
    last_phase_change: NaiveDateTime,
}

impl CycleRecorder {
    /// Start recording at `now`. The wearer is assumed awake until the
    /// classifier says otherwise.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            current_phase: SleepPhase::Awake,
            last_phase_change: now,
        }
    }

    /// Phase currently held by the recorder
    pub fn current_phase(&self) -> SleepPhase {
        self.current_phase
    }

    /// Time of the last recorded phase transition
    pub fn last_phase_change(&self) -> NaiveDateTime {
        self.last_phase_change
    }

    /// Feed one classifier evaluation.
    ///
    /// If the phase changed, returns the closed interval spanning
    /// `[last_phase_change, now)` tagged with the *previous* phase, and
    /// advances the held state. Returns `None` while the run continues.
    pub fn observe(&mut self, phase: SleepPhase, now: NaiveDateTime) -> Option<SleepInterval> {
        if phase == self.current_phase {
            return None;
        }

        let interval = SleepInterval::new(self.current_phase, self.last_phase_change, now);
        self.current_phase = phase;
        self.last_phase_change = now;
        Some(interval)
    }

    /// Close the open run at `now` with the *current* phase.
    ///
    /// Called on explicit stop or teardown so every minute between
    /// monitoring start and stop is covered by exactly one interval.
    /// Returns `None` for a zero-length tail.
    pub fn flush(&mut self, now: NaiveDateTime) -> Option<SleepInterval> {
        if now <= self.last_phase_change {
            return None;
        }

        let interval = SleepInterval::new(self.current_phase, self.last_phase_change, now);
        self.last_phase_change = now;
        Some(interval)
    }
}

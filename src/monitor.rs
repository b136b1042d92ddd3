//! Sleep monitoring state machine
//!
//! Idle -> Monitoring -> Idle, driven by explicit external events and a
//! periodic tick. While monitoring, each tick classifies the current phase
//! and hands transitions to the recorder; emitted intervals are persisted
//! through the injected store.
//!
//! There is exactly one writer: the caller drives ticks sequentially, so
//! persistence is serialized by construction.

use chrono::NaiveDateTime;
use log::warn;

use crate::classifier::{classify_phase, in_monitoring_window, should_halt};
use crate::recorder::CycleRecorder;
use crate::store::IntervalStore;
use crate::types::{MonitorEvent, MonitorState, SleepInterval, SleepPhase};

/// Outcome of a single monitoring tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The monitor is idle; the tick was a no-op
    Idle,
    /// Wall-clock time is outside the monitoring window; nothing recorded
    OutsideWindow,
    /// The wearer stayed awake into the morning; monitoring auto-stopped
    Halted,
    /// The tick classified a phase (and recorded a transition if one
    /// occurred)
    Classified(SleepPhase),
}

/// Snapshot of the monitor's published state.
///
/// Single-writer / multiple-reader: observers see only the latest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStatus {
    pub state: MonitorState,
    pub tracking_enabled: bool,
    pub current_phase: Option<SleepPhase>,
    pub last_phase_change: Option<NaiveDateTime>,
    /// Interval writes dropped due to storage failures since construction
    pub dropped_writes: u64,
}

/// The sleep monitoring loop: classifier + recorder over an injected store.
pub struct SleepMonitor<S: IntervalStore> {
    store: S,
    state: MonitorState,
    tracking_enabled: bool,
    recorder: Option<CycleRecorder>,
    dropped_writes: u64,
}

impl<S: IntervalStore> SleepMonitor<S> {
    /// Create an idle monitor over `store` with tracking enabled.
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: MonitorState::Idle,
            tracking_enabled: true,
            recorder: None,
            dropped_writes: 0,
        }
    }

    /// Deliver an external event (service action or tracking toggle).
    pub fn handle_event(&mut self, event: MonitorEvent, now: NaiveDateTime) {
        match event {
            MonitorEvent::Start => self.start(now),
            MonitorEvent::Stop => self.stop(now),
            MonitorEvent::SetTracking(enabled) => {
                self.tracking_enabled = enabled;
                if !enabled {
                    self.stop(now);
                } else if self.state == MonitorState::Idle {
                    self.start(now);
                }
            }
        }
    }

    /// Begin monitoring at `now`. No-op while already monitoring or with
    /// tracking disabled.
    pub fn start(&mut self, now: NaiveDateTime) {
        if self.state == MonitorState::Monitoring || !self.tracking_enabled {
            return;
        }
        self.state = MonitorState::Monitoring;
        self.recorder = Some(CycleRecorder::new(now));
    }

    /// Stop monitoring at `now`, flushing the open interval.
    pub fn stop(&mut self, now: NaiveDateTime) {
        if let Some(mut recorder) = self.recorder.take() {
            if let Some(interval) = recorder.flush(now) {
                self.persist(interval);
            }
        }
        self.state = MonitorState::Idle;
    }

    /// Run one monitoring tick with the latest sensor-derived scalars.
    pub fn tick(
        &mut self,
        now: NaiveDateTime,
        minutes_since_movement: f64,
        heart_rate: i32,
    ) -> TickOutcome {
        if self.state != MonitorState::Monitoring {
            return TickOutcome::Idle;
        }

        // Halt check uses the held phase: the wearer has been awake and the
        // morning window has arrived.
        let held_phase = self
            .recorder
            .as_ref()
            .map(|r| r.current_phase())
            .unwrap_or(SleepPhase::Awake);
        if should_halt(now.time(), held_phase) {
            self.stop(now);
            return TickOutcome::Halted;
        }

        if !in_monitoring_window(now.time()) {
            return TickOutcome::OutsideWindow;
        }

        let phase = classify_phase(minutes_since_movement, heart_rate);
        if let Some(recorder) = self.recorder.as_mut() {
            if let Some(interval) = recorder.observe(phase, now) {
                self.persist(interval);
            }
        }
        TickOutcome::Classified(phase)
    }

    /// Latest published state.
    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            state: self.state,
            tracking_enabled: self.tracking_enabled,
            current_phase: self.recorder.as_ref().map(|r| r.current_phase()),
            last_phase_change: self.recorder.as_ref().map(|r| r.last_phase_change()),
            dropped_writes: self.dropped_writes,
        }
    }

    /// Shared access to the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store (retention sweeps)
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the monitor and return the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Whether the monitor is currently in the Monitoring state
    pub fn is_monitoring(&self) -> bool {
        self.state == MonitorState::Monitoring
    }

    // Best-effort telemetry: a failed interval write is logged and dropped.
    // The policy lives here, at the caller, not inside the store.
    fn persist(&mut self, interval: SleepInterval) {
        if let Err(e) = self.store.insert(interval) {
            self.dropped_writes += 1;
            warn!("dropping sleep interval after storage failure: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MonitorError;
    use crate::store::{IntervalStore, MemoryIntervalStore};
    use crate::types::SleepInterval;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn night_start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(23, 10, 0)
            .unwrap()
    }

    struct FailingStore;

    impl IntervalStore for FailingStore {
        fn insert(&mut self, _interval: SleepInterval) -> Result<(), MonitorError> {
            Err(MonitorError::Storage("disk full".to_string()))
        }

        fn intervals_between(
            &self,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> Result<Vec<SleepInterval>, MonitorError> {
            Ok(Vec::new())
        }

        fn all(&self) -> Result<Vec<SleepInterval>, MonitorError> {
            Ok(Vec::new())
        }

        fn delete_before(&mut self, _cutoff: NaiveDateTime) -> Result<u64, MonitorError> {
            Ok(0)
        }
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut monitor = SleepMonitor::new(MemoryIntervalStore::new());
        assert_eq!(monitor.tick(night_start(), 2.0, 80), TickOutcome::Idle);
        assert!(monitor.store().is_empty());
    }

    #[test]
    fn test_full_night_produces_contiguous_intervals() {
        let mut monitor = SleepMonitor::new(MemoryIntervalStore::new());
        monitor.handle_event(MonitorEvent::Start, night_start());
        assert!(monitor.is_monitoring());

        // 30 min awake, then the wearer settles: light, deep, rem
        let schedule: Vec<(i64, f64, i32)> = vec![
            (5, 2.0, 85),   // awake
            (10, 3.0, 82),  // awake
            (15, 1.0, 78),  // awake
            (20, 10.0, 62), // light
            (25, 15.0, 60), // light
            (30, 25.0, 47), // deep
            (35, 30.0, 45), // deep
            (40, 50.0, 48), // rem
        ];

        for (offset, movement, hr) in schedule {
            let outcome = monitor.tick(night_start() + Duration::minutes(offset), movement, hr);
            assert!(matches!(outcome, TickOutcome::Classified(_)));
        }

        let stop_at = night_start() + Duration::minutes(45);
        monitor.handle_event(MonitorEvent::Stop, stop_at);

        let intervals = monitor.store().all().unwrap();
        let phases: Vec<SleepPhase> = intervals.iter().map(|i| i.phase).collect();
        assert_eq!(
            phases,
            vec![
                SleepPhase::Awake,
                SleepPhase::LightSleep,
                SleepPhase::DeepSleep,
                SleepPhase::Rem,
            ]
        );

        // Full coverage from start to stop, no gaps
        assert_eq!(intervals.first().unwrap().start_time, night_start());
        assert_eq!(intervals.last().unwrap().end_time, stop_at);
        for pair in intervals.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
    }

    #[test]
    fn test_outside_window_records_nothing() {
        let mut monitor = SleepMonitor::new(MemoryIntervalStore::new());
        let afternoon = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        monitor.handle_event(MonitorEvent::Start, afternoon);

        let outcome = monitor.tick(afternoon + Duration::minutes(5), 2.0, 80);
        assert_eq!(outcome, TickOutcome::OutsideWindow);
        assert!(monitor.store().is_empty());
    }

    #[test]
    fn test_auto_halt_in_morning_window() {
        let mut monitor = SleepMonitor::new(MemoryIntervalStore::new());
        monitor.handle_event(MonitorEvent::Start, night_start());

        // Sleep through the night as rem
        let mut now = night_start() + Duration::minutes(5);
        monitor.tick(now, 60.0, 45);

        // 08:00: wearer is moving with an elevated heart rate
        now = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let outcome = monitor.tick(now, 1.0, 85);
        assert_eq!(outcome, TickOutcome::Classified(SleepPhase::Awake));

        // Next tick sees the held awake phase in the morning window
        let outcome = monitor.tick(now + Duration::minutes(5), 1.0, 85);
        assert_eq!(outcome, TickOutcome::Halted);
        assert!(!monitor.is_monitoring());

        // The flushed tail covers up to the halt tick
        let intervals = monitor.store().all().unwrap();
        assert_eq!(
            intervals.last().unwrap().end_time,
            now + Duration::minutes(5)
        );
    }

    #[test]
    fn test_tracking_toggle_starts_and_stops() {
        let mut monitor = SleepMonitor::new(MemoryIntervalStore::new());

        monitor.handle_event(MonitorEvent::SetTracking(true), night_start());
        assert!(monitor.is_monitoring());

        monitor.handle_event(
            MonitorEvent::SetTracking(false),
            night_start() + Duration::minutes(10),
        );
        assert!(!monitor.is_monitoring());

        // Start is refused while tracking is disabled
        monitor.handle_event(MonitorEvent::Start, night_start() + Duration::minutes(15));
        assert!(!monitor.is_monitoring());
    }

    #[test]
    fn test_storage_failure_is_dropped_not_fatal() {
        let mut monitor = SleepMonitor::new(FailingStore);
        monitor.handle_event(MonitorEvent::Start, night_start());

        monitor.tick(night_start() + Duration::minutes(5), 15.0, 60);
        // Transition awake -> light triggers a write that fails
        let outcome = monitor.tick(night_start() + Duration::minutes(10), 15.0, 60);
        assert!(matches!(outcome, TickOutcome::Classified(_)));

        monitor.handle_event(MonitorEvent::Stop, night_start() + Duration::minutes(15));
        assert!(monitor.status().dropped_writes >= 1);
    }

    #[test]
    fn test_status_snapshot() {
        let mut monitor = SleepMonitor::new(MemoryIntervalStore::new());
        let status = monitor.status();
        assert_eq!(status.state, MonitorState::Idle);
        assert_eq!(status.current_phase, None);

        monitor.handle_event(MonitorEvent::Start, night_start());
        let status = monitor.status();
        assert_eq!(status.state, MonitorState::Monitoring);
        assert_eq!(status.current_phase, Some(SleepPhase::Awake));
        assert_eq!(status.last_phase_change, Some(night_start()));
    }
}

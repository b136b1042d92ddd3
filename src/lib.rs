//! wfit-core - On-device monitoring engine for watch heart-rate and sleep
//! tracking
//!
//! The engine turns raw sensor samples into recorded sleep intervals and
//! heart rate history through a deterministic loop: sensor adaptation →
//! phase classification → cycle recording → persistence → daily
//! aggregation.
//!
//! ## Modules
//!
//! - **Sleep pipeline**: classify phases on a fixed cadence, record one
//!   interval per phase run, bucket nights into diary days
//! - **Heart module**: gate raw readings, keep a bounded history, classify
//!   intensity zones

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod heart;
pub mod monitor;
pub mod recorder;
pub mod sensors;
pub mod store;
pub mod types;

pub use aggregator::{aggregate, bucket_date, sleep_score};
pub use classifier::{classify_phase, in_monitoring_window, should_halt};
pub use error::MonitorError;
pub use monitor::{MonitorStatus, SleepMonitor, TickOutcome};
pub use recorder::CycleRecorder;
pub use store::{sweep_old_intervals, IntervalStore, MemoryIntervalStore};
pub use types::{DailySummary, MonitorEvent, MonitorState, SleepInterval, SleepPhase};

// Heart module exports
pub use heart::{zone_for, HeartRateHistory, HeartRateMonitor, HeartRateZone};

/// Engine version embedded in CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

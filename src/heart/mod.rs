//! Heart rate monitoring
//!
//! The second watch app: validity-gated readings, a bounded measurement
//! history with zone classification, and a buffering background monitor.

pub mod history;
pub mod monitor;
pub mod store;
pub mod types;

pub use history::HeartRateHistory;
pub use monitor::{HeartRateMonitor, HeartSummary};
pub use store::{MeasurementStore, MemoryMeasurementStore};
pub use types::{zone_for, HeartRateMeasurement, HeartRateZone};

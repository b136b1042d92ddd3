//! Error types for the wfit monitoring engine

use thiserror::Error;

/// Errors that can occur while monitoring or persisting data
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Failed to parse stored data: {0}")]
    Parse(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage operation failed: {0}")]
    Storage(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Heart rate sensor unavailable")]
    SensorUnavailable,

    #[error("Body sensor permission not granted")]
    PermissionDenied,

    #[error("Date parse error: {0}")]
    DateParse(String),
}

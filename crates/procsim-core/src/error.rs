//! Error types for procsim-core

use thiserror::Error;

/// Core error types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid point count: {0} (must be greater than zero)")]
    InvalidPointCount(usize),

    #[error("Invalid interval: {0}s (must be a finite number of at least 0.001s)")]
    InvalidInterval(f64),

    #[error("Invalid anomaly probability: {0} (must be within [0, 1])")]
    InvalidProbability(f64),

    #[error("{points} points at {interval_secs}s intervals overflow the supported time range")]
    SpanOverflow { points: usize, interval_secs: f64 },

    #[error("No parameters configured")]
    NoParameters,

    #[error("Empty parameter name")]
    EmptyParameterName,

    #[error("Duplicate parameter: {0}")]
    DuplicateParameter(String),

    #[error("Parameter name '{0}' is reserved for the timestamp column")]
    ReservedParameterName(String),

    #[error("Invalid mean for {name}: {mean}")]
    InvalidMean { name: String, mean: f64 },

    #[error("Invalid standard deviation for {name}: {std_dev} (must be finite and positive)")]
    InvalidStdDev { name: String, std_dev: f64 },

    #[error("Invalid anomaly range for {name}: ({low}, {high})")]
    InvalidAnomalyRange { name: String, low: f64, high: f64 },

    #[error("Record has {actual} values, series has {expected} parameters")]
    RecordWidthMismatch { expected: usize, actual: usize },

    #[error("Record at {current} does not follow {previous}")]
    OutOfOrder { previous: String, current: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

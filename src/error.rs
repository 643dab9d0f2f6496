//! Error types for the sales_forecast crate

use thiserror::Error;

/// Custom error types for the sales_forecast crate
///
/// Every variant is recoverable by the caller; nothing in this crate
/// panics or terminates the process on bad input.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A required column could not be resolved in the input header
    #[error("Schema error: {0}")]
    Schema(String),

    /// A cell in a data row could not be parsed
    #[error("Parse error at data row {row}: {reason}")]
    Parse {
        /// 1-based index of the offending data row (header excluded)
        row: usize,
        reason: String,
    },

    /// The input contained a header but no data rows, or no bytes at all
    #[error("Input contains no data rows")]
    EmptyInput,

    /// A user-supplied parameter is out of range or missing
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The series is too short for the selected backend
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The numerical fit failed; retrying with another backend is valid
    #[error("Model fit did not converge: {0}")]
    Convergence(String),

    /// Historical and forecast series do not line up
    #[error("Series shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream-level error from the CSV reader
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ForecastError {
    /// Shorthand for an [`InvalidParameter`](ForecastError::InvalidParameter)
    /// with a static parameter name.
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        ForecastError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

//! Error types for the sales dashboard core.

use thiserror::Error;

/// Problems with a single input row, detected at load time.
///
/// A malformed row is reported and excluded; it never aborts the load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("row {row}: missing value for column '{column}'")]
    MissingValue { row: usize, column: &'static str },

    #[error("row {row}: column '{column}' expects {expected}, got '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl DataError {
    /// Zero-based data row index (header excluded).
    pub fn row(&self) -> usize {
        match self {
            DataError::MissingValue { row, .. } | DataError::InvalidValue { row, .. } => *row,
        }
    }
}

/// Reasons a forecast cannot be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// The selected region has no records; the model is never invoked.
    #[error("no sales records for region '{region}', nothing to forecast")]
    EmptySeries { region: String },

    #[error("forecast horizon must be between 1 and 10 years, got {0}")]
    InvalidHorizon(u32),

    #[error("interval width must be strictly between 0 and 1, got {0}")]
    InvalidIntervalWidth(f64),

    #[error("forecast model failed: {0}")]
    Model(String),
}

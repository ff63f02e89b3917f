//! Error types for the demand_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The transaction table is malformed (missing required columns).
    /// The only fatal condition: a batch never starts on invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Not enough history for the requested operation
    #[error("insufficient data: need {required} observations, have {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A model could not be fitted to the training window
    #[error("model fit failed: {0}")]
    FitFailure(String),

    /// Error from invalid parameters
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV read/write operations
    #[error("csv error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from serializing records
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("dataframe error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

//! Error types for series generation.

use thiserror::Error;

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Errors that can occur while configuring or running a generation pass.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A feature or factor is configured inconsistently
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A factor needs a feature that the current combination does not carry
    #[error("Factor '{factor}' requires missing feature '{feature}'")]
    MissingFeature {
        /// Column name of the factor that failed
        factor: String,
        /// Name of the feature it looked up
        feature: String,
    },

    /// Empty, inverted or non-increasing date range
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// Requested table is larger than the configured row limit
    #[error(
        "Requested {requested} rows exceeds the limit of {limit}; reduce the date range or the number of feature values"
    )]
    Capacity {
        /// Rows the configuration would produce
        requested: u128,
        /// Maximum rows allowed per run
        limit: usize,
    },

    /// Reference data could not be parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error while reading reference data or writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration document could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl GeneratorError {
    /// Shorthand for a [`GeneratorError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Shorthand for a [`GeneratorError::MissingFeature`] error.
    pub fn missing_feature(factor: &str, feature: &str) -> Self {
        Self::MissingFeature {
            factor: factor.to_string(),
            feature: feature.to_string(),
        }
    }
}

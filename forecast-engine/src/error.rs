//! Error types for forecast engine

use canteen_model::ModelError;
use thiserror::Error;

/// Forecast engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Auto-orders or stock could not be read; no partial report is produced
    #[error("Forecast data source unavailable: {0}")]
    DataSource(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Reference date cannot anchor a full horizon
    #[error("Invalid reference date: {0}")]
    InvalidReference(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ModelError> for Error {
    fn from(err: ModelError) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

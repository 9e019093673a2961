//! Error types for crossvision

use thiserror::Error;

/// Main error type for crossvision
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Series is empty: at least one price point is required")]
    EmptySeries,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing indicator column: {0}")]
    MissingIndicator(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for crossvision operations
pub type Result<T> = std::result::Result<T, ChartError>;

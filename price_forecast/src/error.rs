//! Error types for the price_forecast crate

use polars::prelude::PolarsError;
use series_math::MathError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the pipeline stages
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The entity's input file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The input file exists but could not be read as a table
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Expected columns are absent or cannot be routed
    #[error("Column error: {0}")]
    ColumnError(String),

    /// A date string does not match the configured format
    #[error("Date parse error: {value:?} does not match {format}")]
    DateParseError { value: String, format: String },

    /// Not enough rows or no target to train on
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Model fitting or prediction failed
    #[error("Model error: {0}")]
    ModelError(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<PolarsError> for PipelineError {
    fn from(err: PolarsError) -> Self {
        PipelineError::Polars(err.to_string())
    }
}

impl From<MathError> for PipelineError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => PipelineError::InsufficientData(msg),
            MathError::InvalidInput(msg) => PipelineError::Config(msg),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Config(err.to_string())
    }
}

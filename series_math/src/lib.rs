//! # Series Math
//!
//! Window and summary statistics over ordered numeric series.
//! Series are slices of `Option<f64>`: `None` marks a missing observation and
//! every window that touches one yields `None`.

use thiserror::Error;

pub mod lag;
pub mod rolling;
pub mod stats;

pub use lag::lag;
pub use rolling::{rolling_mean, rolling_std, RollingStdDev, RollingWindow};
pub use stats::ColumnStats;

/// Errors that can occur in series calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;

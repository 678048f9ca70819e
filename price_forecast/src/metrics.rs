//! Regression error metrics

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Mean squared error; NaN when the inputs are empty or of different lengths
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Root mean squared error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_squared_error(actual, predicted).sqrt()
}

/// Coefficient of determination.
///
/// A constant target scores 1.0 when predicted exactly and 0.0 otherwise, so
/// the result never exceeds 1.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let mean = actual.iter().mean();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Held-out evaluation of one entity's model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Rows used for fitting
    pub train_rows: usize,
    /// Rows held out
    pub test_rows: usize,
}

/// Score predictions against held-out targets
pub fn evaluate(actual: &[f64], predicted: &[f64], train_rows: usize) -> Result<Evaluation> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(PipelineError::InsufficientData(
            "Predictions and targets must have the same non-zero length".to_string(),
        ));
    }

    Ok(Evaluation {
        rmse: root_mean_squared_error(actual, predicted),
        r2: r2_score(actual, predicted),
        train_rows,
        test_rows: actual.len(),
    })
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "RMSE: {:.2}", self.rmse)?;
        write!(f, "R2 Score: {:.2}", self.r2)
    }
}

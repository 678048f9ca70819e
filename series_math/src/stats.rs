//! Column summary statistics

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Mean and population standard deviation of the observed values of a column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Mean of the non-missing values (0.0 when nothing was observed)
    pub mean: f64,
    /// Population standard deviation of the non-missing values
    pub std_dev: f64,
    /// Number of non-missing values
    pub count: usize,
}

impl ColumnStats {
    /// Summarise the non-missing values of `values`
    pub fn from_values(values: &[Option<f64>]) -> Self {
        let observed: Vec<f64> = values.iter().flatten().copied().collect();
        if observed.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                count: 0,
            };
        }

        Self {
            mean: observed.iter().mean(),
            std_dev: observed.iter().population_std_dev(),
            count: observed.len(),
        }
    }

    /// Standardise a value; a constant column maps everything to 0
    pub fn standardize(&self, value: f64) -> f64 {
        if self.std_dev == 0.0 || !self.std_dev.is_finite() {
            value - self.mean
        } else {
            (value - self.mean) / self.std_dev
        }
    }

    /// Undo `standardize` for a scaled quantity expressed as a distance
    pub fn unscale_distance(&self, scaled: f64) -> f64 {
        if self.std_dev == 0.0 {
            scaled
        } else {
            scaled * self.std_dev
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_stats_ignore_missing() {
        let stats = ColumnStats::from_values(&[Some(1.0), None, Some(3.0)]);

        assert_eq!(stats.count, 2);
        assert_approx_eq!(stats.mean, 2.0);
        assert_approx_eq!(stats.std_dev, 1.0);
    }

    #[test]
    fn test_constant_column_standardizes_to_zero() {
        let stats = ColumnStats::from_values(&[Some(5.0), Some(5.0), Some(5.0)]);

        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.standardize(5.0), 0.0);
    }

    #[test]
    fn test_empty_column() {
        let stats = ColumnStats::from_values(&[None, None]);

        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, 0.0);
    }
}

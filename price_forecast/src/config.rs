//! Pipeline configuration
//!
//! Every constant the stages rely on (column names, thresholds, windows, split
//! parameters, the entity list) lives here and is passed explicitly through the
//! pipeline. All structs deserialize from JSON with per-field defaults, so a
//! config file only needs the values it overrides.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Raw date column of the market reports
pub const DEFAULT_DATE_COLUMN: &str = "Reported Date";
/// Name the date column is carried under after preprocessing
pub const NORMALIZED_DATE_COLUMN: &str = "date";
/// Target price column
pub const DEFAULT_TARGET_COLUMN: &str = "Modal Price (Rs./Quintal)";

/// Names of the columns the stages look up
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ColumnNames {
    pub date: String,
    pub normalized_date: String,
    pub target: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: DEFAULT_DATE_COLUMN.to_string(),
            normalized_date: NORMALIZED_DATE_COLUMN.to_string(),
            target: DEFAULT_TARGET_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Categorical columns with at least this many distinct values are ordinal-encoded
    pub high_cardinality_threshold: usize,
    /// Fill value for missing categorical entries
    pub missing_placeholder: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            high_cardinality_threshold: 100,
            missing_placeholder: "missing".to_string(),
        }
    }
}

fn default_lag_periods() -> Vec<usize> {
    vec![1, 7, 30]
}

fn default_rolling_windows() -> Vec<usize> {
    vec![7, 30, 90]
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FeatureConfig {
    /// chrono format of the date strings
    pub date_format: String,
    pub lag_periods: Vec<usize>,
    pub rolling_windows: Vec<usize>,
    /// Stable-sort rows by date before deriving lags and windows
    pub sort_by_date: bool,
    /// Consecutive rows further apart than this many days are reported as gaps
    pub max_gap_days: i64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            date_format: "%d/%m/%Y".to_string(),
            lag_periods: default_lag_periods(),
            rolling_windows: default_rolling_windows(),
            sort_by_date: true,
            max_gap_days: 7,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    pub seed: u64,
    pub n_trees: usize,
    pub max_depth: Option<u16>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            n_trees: 100,
            max_depth: None,
        }
    }
}

/// What to do when one entity's pipeline fails
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run on the first failing entity
    #[default]
    FailFast,
    /// Record the failure and continue with the remaining entities
    BestEffort,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding `<Entity>.csv` files
    pub raw_data_dir: PathBuf,
    /// Entities processed, in report order
    pub entities: Vec<String>,
    pub columns: ColumnNames,
    pub preprocess: PreprocessConfig,
    pub features: FeatureConfig,
    pub training: TrainingConfig,
    pub failure_policy: FailurePolicy,
    /// Entities processed concurrently; 1 runs strictly sequentially
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_data_dir: PathBuf::from("data/raw"),
            entities: vec!["Bhindi".to_string()],
            columns: ColumnNames::default(),
            preprocess: PreprocessConfig::default(),
            features: FeatureConfig::default(),
            training: TrainingConfig::default(),
            failure_policy: FailurePolicy::default(),
            workers: 1,
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the stages cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.entities.is_empty() {
            return Err(PipelineError::Config("no entities configured".to_string()));
        }
        if self.preprocess.high_cardinality_threshold == 0 {
            return Err(PipelineError::Config(
                "high_cardinality_threshold must be positive".to_string(),
            ));
        }
        if self.features.lag_periods.iter().any(|&lag| lag == 0) {
            return Err(PipelineError::Config(
                "lag periods must be positive".to_string(),
            ));
        }
        if self.features.rolling_windows.iter().any(|&window| window == 0) {
            return Err(PipelineError::Config(
                "rolling windows must be positive".to_string(),
            ));
        }
        let fraction = self.training.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(PipelineError::Config(format!(
                "test_fraction must be in (0, 1), got {}",
                fraction
            )));
        }
        if self.training.n_trees == 0 {
            return Err(PipelineError::Config("n_trees must be positive".to_string()));
        }
        if self.workers == 0 {
            return Err(PipelineError::Config("workers must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_report_layout() {
        let config = PipelineConfig::default();

        assert_eq!(config.columns.date, "Reported Date");
        assert_eq!(config.columns.target, "Modal Price (Rs./Quintal)");
        assert_eq!(config.features.lag_periods, vec![1, 7, 30]);
        assert_eq!(config.features.rolling_windows, vec![7, 30, 90]);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.training.n_trees, 100);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{"entities": ["Tomato", "Onion"], "failure_policy": "best_effort", "training": {"n_trees": 10}}"#,
        )
        .unwrap();

        assert_eq!(config.entities, vec!["Tomato".to_string(), "Onion".to_string()]);
        assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.training.n_trees, 10);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.raw_data_dir, PathBuf::from("data/raw"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(PipelineConfig::from_json_str(r#"{"training": {"test_fraction": 1.5}}"#).is_err());
        assert!(PipelineConfig::from_json_str(r#"{"entities": []}"#).is_err());
        assert!(PipelineConfig::from_json_str(r#"{"features": {"rolling_windows": [0]}}"#).is_err());
        assert!(PipelineConfig::from_json_str(r#"{"workers": 0}"#).is_err());
    }
}

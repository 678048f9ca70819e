//! Model fitting and held-out evaluation

use crate::config::{ColumnNames, TrainingConfig};
use crate::error::{PipelineError, Result};
use crate::frame::{column_as_f64, series_as_f64};
use crate::metrics::{evaluate, Evaluation};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::{debug, info, warn};

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Shuffle row positions with a fixed seed and hold out `ceil(n * test_fraction)` of them.
///
/// Returns `(train, test)`.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rows: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);

    let test_size = ((n_rows as f64) * test_fraction).ceil() as usize;
    let test_size = test_size.min(n_rows);
    let train = rows.split_off(test_size);
    (train, rows)
}

/// Feature matrix and target of a table
#[derive(Debug, Clone)]
pub struct Design {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub target: Vec<f64>,
}

/// Random forest fitted on one entity
pub struct TrainedModel {
    forest: Forest,
    feature_names: Vec<String>,
    n_trees: usize,
}

impl std::fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedModel")
            .field("n_trees", &self.n_trees)
            .field("feature_names", &self.feature_names)
            .finish()
    }
}

impl TrainedModel {
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Predict one value per feature row
    pub fn predict(&self, rows: &Vec<Vec<f64>>) -> Result<Vec<f64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(row) = rows.iter().find(|row| row.len() != self.feature_names.len()) {
            return Err(PipelineError::ModelError(format!(
                "Expected {} features, got {}",
                self.feature_names.len(),
                row.len()
            )));
        }

        let x = DenseMatrix::from_2d_vec(rows)
            .map_err(|e| PipelineError::ModelError(format!("Failed to build feature matrix: {}", e)))?;
        self.forest
            .predict(&x)
            .map_err(|e| PipelineError::ModelError(format!("Prediction failed: {}", e)))
    }
}

/// Model together with its held-out scores
#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub evaluation: Evaluation,
}

/// Splits an engineered table, fits the forest and scores it
#[derive(Debug, Clone)]
pub struct Trainer {
    columns: ColumnNames,
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(columns: &ColumnNames, config: &TrainingConfig) -> Self {
        Self {
            columns: columns.clone(),
            config: config.clone(),
        }
    }

    /// Every column except the target and the date
    pub fn feature_columns(&self, df: &DataFrame) -> Vec<String> {
        let excluded = [
            self.columns.target.as_str(),
            self.columns.date.as_str(),
            self.columns.normalized_date.as_str(),
        ];
        df.get_column_names()
            .into_iter()
            .filter(|name| !excluded.contains(name))
            .map(str::to_string)
            .collect()
    }

    /// Extract the feature matrix and target; rows with any missing value are skipped
    pub fn design(&self, df: &DataFrame) -> Result<Design> {
        let target_name = &self.columns.target;
        let target = match df.column(target_name) {
            Ok(col) if col.dtype().is_numeric() => series_as_f64(col)?,
            Ok(col) => {
                return Err(PipelineError::InsufficientData(format!(
                    "Target column '{}' is not numeric ({})",
                    target_name,
                    col.dtype()
                )))
            }
            Err(_) => {
                return Err(PipelineError::InsufficientData(format!(
                    "Target column '{}' is absent",
                    target_name
                )))
            }
        };

        let feature_names = self.feature_columns(df);
        if feature_names.is_empty() {
            return Err(PipelineError::InsufficientData(
                "No feature columns besides the target".to_string(),
            ));
        }
        let features = feature_names
            .iter()
            .map(|name| column_as_f64(df, name))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(df.height());
        let mut targets = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let values: Option<Vec<f64>> = features.iter().map(|column| column[row]).collect();
            match (values, target[row]) {
                (Some(values), Some(y)) => {
                    rows.push(values);
                    targets.push(y);
                }
                _ => continue,
            }
        }

        let skipped = df.height() - rows.len();
        if skipped > 0 {
            warn!("Skipped {} rows with missing values", skipped);
        }

        Ok(Design {
            feature_names,
            rows,
            target: targets,
        })
    }

    /// Fit a forest on the given rows
    pub fn fit(&self, feature_names: Vec<String>, rows: &Vec<Vec<f64>>, target: &Vec<f64>) -> Result<TrainedModel> {
        if rows.is_empty() {
            return Err(PipelineError::InsufficientData(
                "Training partition is empty".to_string(),
            ));
        }

        let x = DenseMatrix::from_2d_vec(rows)
            .map_err(|e| PipelineError::ModelError(format!("Failed to build feature matrix: {}", e)))?;

        let mut parameters = RandomForestRegressorParameters::default()
            .with_n_trees(self.config.n_trees)
            .with_seed(self.config.seed);
        if let Some(depth) = self.config.max_depth {
            parameters = parameters.with_max_depth(depth);
        }

        debug!(
            "Fitting {} trees on {} rows x {} features",
            self.config.n_trees,
            rows.len(),
            feature_names.len()
        );
        let forest = Forest::fit(&x, target, parameters)
            .map_err(|e| PipelineError::ModelError(format!("Training failed: {}", e)))?;

        Ok(TrainedModel {
            forest,
            feature_names,
            n_trees: self.config.n_trees,
        })
    }

    /// Split, fit on the training rows and score on the held-out rows
    pub fn train_and_evaluate(&self, df: &DataFrame) -> Result<TrainingOutcome> {
        let design = self.design(df)?;
        let (train, test) = train_test_split(
            design.rows.len(),
            self.config.test_fraction,
            self.config.seed,
        );
        if train.is_empty() || test.is_empty() {
            return Err(PipelineError::InsufficientData(format!(
                "Cannot split {} rows into train and test partitions",
                design.rows.len()
            )));
        }

        let select = |rows: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
            rows.iter()
                .map(|&row| (design.rows[row].clone(), design.target[row]))
                .unzip()
        };
        let (x_train, y_train) = select(&train);
        let (x_test, y_test) = select(&test);

        info!(
            "Training on {} rows, evaluating on {} rows",
            x_train.len(),
            x_test.len()
        );
        let model = self.fit(design.feature_names.clone(), &x_train, &y_train)?;
        let predictions = model.predict(&x_test)?;
        let evaluation = evaluate(&y_test, &predictions, x_train.len())?;

        Ok(TrainingOutcome { model, evaluation })
    }
}

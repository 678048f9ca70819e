//! Per-entity orchestration
//!
//! Loader -> Preprocessor -> Feature Engineer -> Trainer, once per configured
//! entity. Entities share no state, so they may run on a bounded worker pool;
//! the report always lists them in configured order.

use crate::config::{FailurePolicy, PipelineConfig};
use crate::data::DataLoader;
use crate::error::{PipelineError, Result};
use crate::features::FeatureEngineer;
use crate::metrics::Evaluation;
use crate::preprocessing::Preprocessor;
use crate::training::{TrainedModel, Trainer};
use polars::prelude::DataFrame;
use rayon::prelude::*;
use series_math::ColumnStats;
use tracing::{error, info};

/// Everything produced for one entity
#[derive(Debug)]
pub struct EntityResult {
    pub entity: String,
    pub raw_shape: (usize, usize),
    pub processed_shape: (usize, usize),
    pub engineered_shape: (usize, usize),
    /// Whether calendar and price-history columns were derived
    pub time_features: bool,
    pub feature_names: Vec<String>,
    /// Scaling statistics of the target, when it was a numeric input column
    pub target_stats: Option<ColumnStats>,
    pub model: TrainedModel,
    pub evaluation: Evaluation,
}

impl EntityResult {
    /// RMSE expressed in the target's original units
    pub fn rmse_in_price_units(&self) -> Option<f64> {
        self.target_stats
            .map(|stats| stats.unscale_distance(self.evaluation.rmse))
    }
}

/// Outcome of one entity's run
#[derive(Debug)]
pub struct EntityReport {
    pub entity: String,
    pub outcome: Result<EntityResult>,
}

/// Outcomes of every entity, in configured order
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub entities: Vec<EntityReport>,
}

impl PipelineReport {
    pub fn get(&self, entity: &str) -> Option<&EntityReport> {
        self.entities.iter().find(|report| report.entity == entity)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &EntityResult> {
        self.entities
            .iter()
            .filter_map(|report| report.outcome.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &PipelineError)> {
        self.entities.iter().filter_map(|report| {
            report
                .outcome
                .as_ref()
                .err()
                .map(|err| (report.entity.as_str(), err))
        })
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Runs the full pipeline over the configured entities
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run stages 2-4 on a table that is already in memory
    pub fn process_table(&self, entity: &str, raw: &DataFrame) -> Result<EntityResult> {
        let config = &self.config;
        let raw_shape = raw.shape();
        info!("Processing {} ({} rows x {} columns)", entity, raw_shape.0, raw_shape.1);

        let (_, table) =
            Preprocessor::new(&config.columns, &config.preprocess).fit_transform(raw)?;
        let processed_shape = table.shape();
        let target_stats = table.numeric_stats(&config.columns.target).copied();

        let outcome = FeatureEngineer::new(&config.columns, &config.features).engineer(table)?;
        let time_features = outcome.has_time_features();
        let engineered = outcome.into_frame();
        let engineered_shape = engineered.shape();

        let trained =
            Trainer::new(&config.columns, &config.training).train_and_evaluate(&engineered)?;
        info!(
            "{}: RMSE {:.4}, R2 {:.4}",
            entity, trained.evaluation.rmse, trained.evaluation.r2
        );

        Ok(EntityResult {
            entity: entity.to_string(),
            raw_shape,
            processed_shape,
            engineered_shape,
            time_features,
            feature_names: trained.model.feature_names().to_vec(),
            target_stats,
            model: trained.model,
            evaluation: trained.evaluation,
        })
    }

    /// Load and process one entity
    pub fn run_entity(&self, entity: &str) -> Result<EntityResult> {
        let table = DataLoader::load_entity(&self.config, entity)?;
        self.process_table(entity, &table.frame)
    }

    fn run_all(&self) -> Result<Vec<EntityReport>> {
        let entities = &self.config.entities;
        if self.config.workers <= 1 {
            let mut reports = Vec::with_capacity(entities.len());
            for entity in entities {
                let outcome = match self.run_entity(entity) {
                    Err(err) if self.config.failure_policy == FailurePolicy::FailFast => {
                        return Err(err)
                    }
                    outcome => outcome,
                };
                reports.push(EntityReport {
                    entity: entity.clone(),
                    outcome,
                });
            }
            return Ok(reports);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build worker pool: {}", e)))?;
        Ok(pool.install(|| {
            entities
                .par_iter()
                .map(|entity| EntityReport {
                    entity: entity.clone(),
                    outcome: self.run_entity(entity),
                })
                .collect::<Vec<_>>()
        }))
    }

    /// Run every configured entity.
    ///
    /// Under `FailFast` the first failure (in configured order) is returned as
    /// the error; under `BestEffort` failures are recorded in the report.
    pub fn run(&self) -> Result<PipelineReport> {
        let mut entities = self.run_all()?;

        if self.config.failure_policy == FailurePolicy::FailFast {
            if let Some(position) = entities.iter().position(|report| report.outcome.is_err()) {
                if let Err(err) = entities.swap_remove(position).outcome {
                    return Err(err);
                }
            }
        }

        let report = PipelineReport { entities };
        for (entity, err) in report.failed() {
            error!("{} failed: {}", entity, err);
        }
        Ok(report)
    }
}

/// Print the per-entity summary to stdout
pub fn print_summary(report: &PipelineReport) {
    for entity in &report.entities {
        match &entity.outcome {
            Ok(result) => {
                println!("Results for {}:", result.entity);
                println!(
                    "Rows: raw {} -> processed {} -> engineered {}",
                    result.raw_shape.0, result.processed_shape.0, result.engineered_shape.0
                );
                println!("Features ({}): {}", result.feature_names.len(), result.feature_names.join(", "));
                if !result.time_features {
                    println!("Time-based features: skipped (no date column)");
                }
                println!("{}", result.evaluation);
                if let Some(rmse) = result.rmse_in_price_units() {
                    println!("RMSE (price units): {:.2}", rmse);
                }
            }
            Err(err) => {
                println!("Results for {}:", entity.entity);
                println!("Failed: {}", err);
            }
        }
        println!("\n{}\n", "=".repeat(50));
    }
}

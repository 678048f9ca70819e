//! Raw table loading
//!
//! One CSV file per entity, resolved as `<raw_data_dir>/<Entity>.csv`. The
//! loader performs no transformation; column typing is whatever the CSV reader
//! infers.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Raw table of one entity
#[derive(Debug, Clone)]
pub struct EntityTable {
    /// Entity (commodity) name
    pub entity: String,
    /// File the table was read from
    pub source: PathBuf,
    /// Rows x named columns as read
    pub frame: DataFrame,
}

impl EntityTable {
    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }
}

/// Data loader for raw entity tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Conventional path of an entity's file
    pub fn entity_path<P: AsRef<Path>>(raw_data_dir: P, entity: &str) -> PathBuf {
        raw_data_dir.as_ref().join(format!("{}.csv", entity))
    }

    /// Load a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()
            .map_err(|e| PipelineError::ParseError(format!("{}: {}", path.display(), e)))?;

        if df.width() == 0 || df.height() == 0 {
            return Err(PipelineError::ParseError(format!(
                "{}: no rows found",
                path.display()
            )));
        }

        Ok(df)
    }

    /// Load one entity's raw table
    pub fn load_entity(config: &PipelineConfig, entity: &str) -> Result<EntityTable> {
        let source = Self::entity_path(&config.raw_data_dir, entity);
        info!("Loading data for {} from {}", entity, source.display());

        let frame = Self::from_csv(&source)?;
        Ok(EntityTable {
            entity: entity.to_string(),
            source,
            frame,
        })
    }
}

/// Load every configured entity, in configured order
pub fn collect_all(config: &PipelineConfig) -> Result<Vec<EntityTable>> {
    config
        .entities
        .iter()
        .map(|entity| DataLoader::load_entity(config, entity))
        .collect()
}

//! Column preprocessing
//!
//! Routes every column of a raw table to one of three transform blocks and
//! reassembles the outputs into a single all-numeric feature table:
//!
//! - numeric: mean imputation, then standard scaling
//! - low-cardinality categorical: `"missing"` imputation, then one-hot encoding
//! - high-cardinality categorical: `"missing"` imputation, then ordinal encoding
//!
//! The date column bypasses the transforms and is reattached verbatim under
//! the normalized name.

pub mod classify;
pub mod transforms;

pub use classify::{cardinality, classify_columns, ColumnGroups, ColumnKind};
pub use transforms::{
    indicator_name, ColumnTransform, NumericTransform, OneHotTransform, OrdinalTransform,
    UNKNOWN_ORDINAL,
};

use crate::config::{ColumnNames, PreprocessConfig};
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use series_math::ColumnStats;
use std::collections::HashMap;
use tracing::{debug, info};

/// Output of preprocessing: encoded features plus the untouched date column
#[derive(Debug, Clone)]
pub struct FeatureTable {
    frame: DataFrame,
    date_column: Option<String>,
    numeric_stats: Vec<(String, ColumnStats)>,
}

impl FeatureTable {
    /// Wrap an already-encoded frame
    pub fn from_frame(frame: DataFrame, date_column: Option<String>) -> Self {
        Self {
            frame,
            date_column,
            numeric_stats: Vec::new(),
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Name of the carried date column, when the raw table had one
    pub fn date_column(&self) -> Option<&str> {
        self.date_column.as_deref()
    }

    /// The carried date column
    pub fn date(&self) -> Option<&Series> {
        self.date_column
            .as_deref()
            .and_then(|name| self.frame.column(name).ok())
    }

    /// Scaling statistics of a numeric input column
    pub fn numeric_stats(&self, column: &str) -> Option<&ColumnStats> {
        self.numeric_stats
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, stats)| stats)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// Unfitted preprocessing settings
#[derive(Debug, Clone)]
pub struct Preprocessor {
    columns: ColumnNames,
    config: PreprocessConfig,
}

/// Preprocessing fitted on one table, reusable on others
#[derive(Debug, Clone)]
pub struct FittedPreprocessor {
    columns: ColumnNames,
    groups: ColumnGroups,
    numeric: NumericTransform,
    one_hot: OneHotTransform,
    ordinal: OrdinalTransform,
}

/// Find the date column under its raw or its normalized name
fn locate_date_column(df: &DataFrame, columns: &ColumnNames) -> Option<String> {
    let names = df.get_column_names();
    [&columns.date, &columns.normalized_date]
        .into_iter()
        .find(|candidate| names.contains(&candidate.as_str()))
        .cloned()
}

impl Preprocessor {
    pub fn new(columns: &ColumnNames, config: &PreprocessConfig) -> Self {
        Self {
            columns: columns.clone(),
            config: config.clone(),
        }
    }

    /// Classify the columns of `df` and fit the three transform blocks on it
    pub fn fit(&self, df: &DataFrame) -> Result<FittedPreprocessor> {
        let date_column = locate_date_column(df, &self.columns);
        let groups = classify_columns(
            df,
            date_column.as_deref(),
            self.config.high_cardinality_threshold,
        )?;

        if groups.is_empty() {
            return Err(PipelineError::ColumnError(
                "No numeric or categorical columns to preprocess".to_string(),
            ));
        }

        debug!("Numeric columns: {:?}", groups.numeric);
        debug!("Low cardinality columns: {:?}", groups.low_cardinality);
        debug!("High cardinality columns: {:?}", groups.high_cardinality);

        let placeholder = self.config.missing_placeholder.as_str();
        let fitted = FittedPreprocessor {
            columns: self.columns.clone(),
            numeric: NumericTransform::fit(df, &groups.numeric)?,
            one_hot: OneHotTransform::fit(df, &groups.low_cardinality, placeholder)?,
            ordinal: OrdinalTransform::fit(df, &groups.high_cardinality, placeholder)?,
            groups,
        };
        fitted.check_output_names()?;
        Ok(fitted)
    }

    /// Fit on `df` and transform the same data
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedPreprocessor, FeatureTable)> {
        let fitted = self.fit(df)?;
        let table = fitted.transform(df)?;
        Ok((fitted, table))
    }
}

impl FittedPreprocessor {
    pub fn groups(&self) -> &ColumnGroups {
        &self.groups
    }

    /// Transform blocks in output order; empty blocks are skipped
    pub fn blocks(&self) -> Vec<&dyn ColumnTransform> {
        let blocks: [&dyn ColumnTransform; 3] = [&self.numeric, &self.one_hot, &self.ordinal];
        blocks.into_iter().filter(|block| !block.is_empty()).collect()
    }

    pub fn output_names(&self) -> Vec<String> {
        self.blocks()
            .into_iter()
            .flat_map(|block| block.output_names())
            .collect()
    }

    pub fn one_hot(&self) -> &OneHotTransform {
        &self.one_hot
    }

    pub fn numeric(&self) -> &NumericTransform {
        &self.numeric
    }

    /// Fail when two input columns would produce the same output column
    fn check_output_names(&self) -> Result<()> {
        let mut sources: HashMap<String, String> = HashMap::new();
        for block in self.blocks() {
            for (output, source) in block.output_sources() {
                if let Some(previous) = sources.get(&output) {
                    return Err(PipelineError::ColumnError(format!(
                        "Columns '{}' and '{}' both produce output column '{}'",
                        previous, source, output
                    )));
                }
                sources.insert(output, source);
            }
        }
        Ok(())
    }

    /// Apply the fitted blocks to `df` and reattach its date column
    pub fn transform(&self, df: &DataFrame) -> Result<FeatureTable> {
        let mut columns = Vec::new();
        for block in self.blocks() {
            transforms::check_inputs(block, df)?;
            columns.extend(block.transform(df)?);
        }

        let date_column = match locate_date_column(df, &self.columns) {
            Some(source) => {
                let mut date = df.column(&source)?.cast(&DataType::Utf8)?;
                date.rename(&self.columns.normalized_date);
                columns.push(date);
                Some(self.columns.normalized_date.clone())
            }
            None => None,
        };

        let frame = DataFrame::new(columns)?;
        info!(
            "Preprocessed {} rows into {} columns",
            frame.height(),
            frame.width()
        );

        let numeric_stats = self
            .groups
            .numeric
            .iter()
            .filter_map(|name| self.numeric.stats(name).map(|stats| (name.clone(), *stats)))
            .collect();

        Ok(FeatureTable {
            frame,
            date_column,
            numeric_stats,
        })
    }
}

/// Fit and apply preprocessing on one entity's raw table
pub fn preprocess(
    df: &DataFrame,
    columns: &ColumnNames,
    config: &PreprocessConfig,
) -> Result<FeatureTable> {
    let (_, table) = Preprocessor::new(columns, config).fit_transform(df)?;
    Ok(table)
}

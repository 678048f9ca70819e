//! Column-block transforms
//!
//! Each transform is fitted once on a frame and can then be applied to any
//! frame holding the same input columns. Categories unseen at fit time never
//! fail a transform: one-hot blocks emit all zeros, ordinal codes emit -1.

use crate::error::{PipelineError, Result};
use crate::frame::{column_as_f64, column_as_strings};
use polars::prelude::*;
use series_math::ColumnStats;
use std::collections::BTreeSet;
use std::fmt::Debug;

/// Code assigned to categories the ordinal encoder has not seen
pub const UNKNOWN_ORDINAL: f64 = -1.0;

/// A fitted transform over a block of columns
pub trait ColumnTransform: Debug + Send + Sync {
    /// Columns read from the input frame
    fn input_columns(&self) -> Vec<String>;

    /// Names of the produced columns, in output order
    fn output_names(&self) -> Vec<String>;

    /// Apply the transform, producing one Float64 series per output name
    fn transform(&self, df: &DataFrame) -> Result<Vec<Series>>;

    /// Each output name paired with the input column it is derived from
    fn output_sources(&self) -> Vec<(String, String)> {
        self.output_names()
            .into_iter()
            .zip(self.input_columns())
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.input_columns().is_empty()
    }
}

/// Name of the indicator column for one category
pub fn indicator_name(column: &str, category: &str) -> String {
    format!("{}_{}", column, category)
}

fn impute_categories(values: Vec<Option<String>>, placeholder: &str) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.unwrap_or_else(|| placeholder.to_string()))
        .collect()
}

fn fit_categories(df: &DataFrame, column: &str, placeholder: &str) -> Result<Vec<String>> {
    let values = impute_categories(column_as_strings(df, column)?, placeholder);
    Ok(values.into_iter().collect::<BTreeSet<_>>().into_iter().collect())
}

/// Mean imputation followed by standard scaling
#[derive(Debug, Clone, Default)]
pub struct NumericTransform {
    columns: Vec<(String, ColumnStats)>,
}

impl NumericTransform {
    pub fn fit(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let columns = columns
            .iter()
            .map(|name| {
                let raw = column_as_f64(df, name)?;
                let mean = ColumnStats::from_values(&raw).mean;
                // Scale statistics are taken after imputation
                let imputed: Vec<Option<f64>> =
                    raw.iter().map(|value| Some(value.unwrap_or(mean))).collect();
                Ok((name.clone(), ColumnStats::from_values(&imputed)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Fitted statistics of a column
    pub fn stats(&self, column: &str) -> Option<&ColumnStats> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, stats)| stats)
    }
}

impl ColumnTransform for NumericTransform {
    fn input_columns(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    fn output_names(&self) -> Vec<String> {
        self.input_columns()
    }

    fn transform(&self, df: &DataFrame) -> Result<Vec<Series>> {
        self.columns
            .iter()
            .map(|(name, stats)| {
                let scaled: Vec<f64> = column_as_f64(df, name)?
                    .into_iter()
                    .map(|value| stats.standardize(value.unwrap_or(stats.mean)))
                    .collect();
                Ok(Series::new(name, scaled))
            })
            .collect()
    }
}

/// Constant imputation followed by one indicator column per category
#[derive(Debug, Clone, Default)]
pub struct OneHotTransform {
    placeholder: String,
    columns: Vec<(String, Vec<String>)>,
}

impl OneHotTransform {
    pub fn fit(df: &DataFrame, columns: &[String], placeholder: &str) -> Result<Self> {
        let columns = columns
            .iter()
            .map(|name| Ok((name.clone(), fit_categories(df, name, placeholder)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            placeholder: placeholder.to_string(),
            columns,
        })
    }

    /// Fitted categories of a column, sorted
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, categories)| categories.as_slice())
    }
}

impl ColumnTransform for OneHotTransform {
    fn input_columns(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    fn output_names(&self) -> Vec<String> {
        self.output_sources()
            .into_iter()
            .map(|(output, _)| output)
            .collect()
    }

    fn output_sources(&self) -> Vec<(String, String)> {
        self.columns
            .iter()
            .flat_map(|(name, categories)| {
                categories
                    .iter()
                    .map(move |category| (indicator_name(name, category), name.clone()))
            })
            .collect()
    }

    fn transform(&self, df: &DataFrame) -> Result<Vec<Series>> {
        let mut output = Vec::new();
        for (name, categories) in &self.columns {
            let values = impute_categories(column_as_strings(df, name)?, &self.placeholder);
            for category in categories {
                let indicator: Vec<f64> = values
                    .iter()
                    .map(|value| if value == category { 1.0 } else { 0.0 })
                    .collect();
                output.push(Series::new(&indicator_name(name, category), indicator));
            }
        }
        Ok(output)
    }
}

/// Constant imputation followed by integer codes in sorted category order
#[derive(Debug, Clone, Default)]
pub struct OrdinalTransform {
    placeholder: String,
    columns: Vec<(String, Vec<String>)>,
}

impl OrdinalTransform {
    pub fn fit(df: &DataFrame, columns: &[String], placeholder: &str) -> Result<Self> {
        let columns = columns
            .iter()
            .map(|name| Ok((name.clone(), fit_categories(df, name, placeholder)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            placeholder: placeholder.to_string(),
            columns,
        })
    }

    fn code(categories: &[String], value: &str) -> f64 {
        categories
            .binary_search_by(|category| category.as_str().cmp(value))
            .map(|index| index as f64)
            .unwrap_or(UNKNOWN_ORDINAL)
    }
}

impl ColumnTransform for OrdinalTransform {
    fn input_columns(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    fn output_names(&self) -> Vec<String> {
        self.input_columns()
    }

    fn transform(&self, df: &DataFrame) -> Result<Vec<Series>> {
        self.columns
            .iter()
            .map(|(name, categories)| {
                let codes: Vec<f64> =
                    impute_categories(column_as_strings(df, name)?, &self.placeholder)
                        .iter()
                        .map(|value| Self::code(categories, value))
                        .collect();
                Ok(Series::new(name, codes))
            })
            .collect()
    }
}

/// Make sure a frame carries every column a transform reads
pub fn check_inputs(transform: &dyn ColumnTransform, df: &DataFrame) -> Result<()> {
    let names = df.get_column_names();
    let missing: Vec<String> = transform
        .input_columns()
        .into_iter()
        .filter(|column| !names.contains(&column.as_str()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::ColumnError(format!(
            "Columns missing at transform time: {}",
            missing.join(", ")
        )))
    }
}

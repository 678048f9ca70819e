//! Column extraction and row selection over polars frames

use crate::error::{PipelineError, Result};
use polars::prelude::*;

/// Look up a column, reporting its absence as a column error
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map_err(|_| PipelineError::ColumnError(format!("Column '{}' not found", name)))
}

/// Get a column as optional f64 values
pub fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = require_column(df, name)?;
    series_as_f64(col)
}

/// Get a series as optional f64 values
pub fn series_as_f64(col: &Series) -> Result<Vec<Option<f64>>> {
    if !col.dtype().is_numeric() {
        return Err(PipelineError::ColumnError(format!(
            "Column '{}' of type {} cannot be converted to f64",
            col.name(),
            col.dtype()
        )));
    }
    let cast = col.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Get a column as optional strings, casting non-string types
pub fn column_as_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = require_column(df, name)?;
    series_as_strings(col)
}

/// Get a series as optional strings, casting non-string types
pub fn series_as_strings(col: &Series) -> Result<Vec<Option<String>>> {
    let cast = col.cast(&DataType::Utf8)?;
    Ok(cast
        .utf8()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Build a new frame from the given row positions, in the given order
pub fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    if let Some(&row) = rows.iter().find(|&&row| row >= df.height()) {
        return Err(PipelineError::InsufficientData(format!(
            "Row {} out of bounds for a frame of {} rows",
            row,
            df.height()
        )));
    }

    let idx = IdxCa::from_vec("idx", rows.iter().map(|&row| row as IdxSize).collect());
    Ok(df.take(&idx)?)
}

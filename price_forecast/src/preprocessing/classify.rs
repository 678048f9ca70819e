//! Column routing by semantic type

use crate::error::Result;
use crate::frame::series_as_strings;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Integer or floating point
    Numeric,
    /// Categorical with fewer distinct values than the threshold
    LowCardinality,
    /// Categorical with at least as many distinct values as the threshold
    HighCardinality,
}

/// Column names grouped by kind, in frame order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnGroups {
    pub numeric: Vec<String>,
    pub low_cardinality: Vec<String>,
    pub high_cardinality: Vec<String>,
}

impl ColumnGroups {
    /// Kind assigned to a column, if it was routed at all
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        let contains = |group: &[String]| group.iter().any(|col| col == name);
        if contains(&self.numeric) {
            Some(ColumnKind::Numeric)
        } else if contains(&self.low_cardinality) {
            Some(ColumnKind::LowCardinality)
        } else if contains(&self.high_cardinality) {
            Some(ColumnKind::HighCardinality)
        } else {
            None
        }
    }

    /// Total number of routed columns
    pub fn len(&self) -> usize {
        self.numeric.len() + self.low_cardinality.len() + self.high_cardinality.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when no categorical column is left
    pub fn is_numeric_only(&self) -> bool {
        self.low_cardinality.is_empty() && self.high_cardinality.is_empty()
    }
}

/// Count the distinct non-missing values of a column
pub fn cardinality(col: &Series) -> Result<usize> {
    let values = series_as_strings(col)?;
    Ok(values.iter().flatten().collect::<HashSet<_>>().len())
}

/// Route every column except `date_column` to exactly one kind
pub fn classify_columns(
    df: &DataFrame,
    date_column: Option<&str>,
    threshold: usize,
) -> Result<ColumnGroups> {
    let mut groups = ColumnGroups::default();

    for col in df.get_columns() {
        let name = col.name();
        if Some(name) == date_column {
            continue;
        }

        if col.dtype().is_numeric() {
            groups.numeric.push(name.to_string());
        } else if cardinality(col)? < threshold {
            groups.low_cardinality.push(name.to_string());
        } else {
            groups.high_cardinality.push(name.to_string());
        }
    }

    Ok(groups)
}

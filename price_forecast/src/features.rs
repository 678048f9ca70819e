//! Calendar and price-history features
//!
//! Lags and rolling windows are positional: they count rows, not days. Rows
//! are put in date order first (unless disabled), and calendar gaps larger than
//! the configured tolerance are reported but not filled.

use crate::config::{ColumnNames, FeatureConfig};
use crate::error::{PipelineError, Result};
use crate::frame::{column_as_f64, column_as_strings, take_rows};
use crate::preprocessing::FeatureTable;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use series_math::{lag, rolling_mean, rolling_std};
use tracing::{debug, info, warn};

/// Result of feature engineering
#[derive(Debug, Clone)]
pub enum FeatureOutcome {
    /// Calendar, lag and rolling columns were derived
    Derived(DataFrame),
    /// The table carried no date column and passed through unchanged
    NoDateColumn(DataFrame),
}

impl FeatureOutcome {
    pub fn frame(&self) -> &DataFrame {
        match self {
            FeatureOutcome::Derived(df) | FeatureOutcome::NoDateColumn(df) => df,
        }
    }

    pub fn into_frame(self) -> DataFrame {
        match self {
            FeatureOutcome::Derived(df) | FeatureOutcome::NoDateColumn(df) => df,
        }
    }

    pub fn has_time_features(&self) -> bool {
        matches!(self, FeatureOutcome::Derived(_))
    }
}

/// Calendar column names
pub const DAY_OF_WEEK: &str = "day_of_week";
pub const MONTH: &str = "month";
pub const YEAR: &str = "year";

pub fn lag_column(periods: usize) -> String {
    format!("price_lag_{}", periods)
}

pub fn rolling_mean_column(window: usize) -> String {
    format!("price_rolling_mean_{}", window)
}

pub fn rolling_std_column(window: usize) -> String {
    format!("price_rolling_std_{}", window)
}

/// Parse date strings; missing entries stay missing
pub fn parse_dates(values: &[Option<String>], format: &str) -> Result<Vec<Option<NaiveDate>>> {
    values
        .iter()
        .map(|value| match value {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), format)
                .map(Some)
                .map_err(|_| PipelineError::DateParseError {
                    value: raw.clone(),
                    format: format.to_string(),
                }),
            None => Ok(None),
        })
        .collect()
}

/// Stable ordering of row positions by date, missing dates last
fn chronological_order(dates: &[Option<NaiveDate>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by_key(|&row| (dates[row].is_none(), dates[row]));
    order
}

/// Number of consecutive dated rows more than `max_gap_days` apart, and the largest gap
fn calendar_gaps(dates: &[Option<NaiveDate>], max_gap_days: i64) -> (usize, i64) {
    let observed: Vec<NaiveDate> = dates.iter().flatten().copied().collect();
    observed
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .fold((0, 0), |(count, largest), gap| {
            let count = if gap > max_gap_days { count + 1 } else { count };
            (count, largest.max(gap))
        })
}

/// Derives calendar and price-history columns from a feature table
#[derive(Debug, Clone)]
pub struct FeatureEngineer {
    columns: ColumnNames,
    config: FeatureConfig,
}

impl FeatureEngineer {
    pub fn new(columns: &ColumnNames, config: &FeatureConfig) -> Self {
        Self {
            columns: columns.clone(),
            config: config.clone(),
        }
    }

    /// Names of every derived column, in output order
    pub fn derived_columns(&self) -> Vec<String> {
        let mut names = vec![DAY_OF_WEEK.to_string(), MONTH.to_string(), YEAR.to_string()];
        names.extend(self.config.lag_periods.iter().map(|&k| lag_column(k)));
        for &window in &self.config.rolling_windows {
            names.push(rolling_mean_column(window));
            names.push(rolling_std_column(window));
        }
        names
    }

    /// Derive features; a table without a date column passes through unchanged
    pub fn engineer(&self, table: FeatureTable) -> Result<FeatureOutcome> {
        let date_column = match table.date_column() {
            Some(name) => name.to_string(),
            None => {
                warn!("No date column found, skipping time-based feature engineering");
                return Ok(FeatureOutcome::NoDateColumn(table.into_frame()));
            }
        };

        let mut frame = table.into_frame();
        debug!("Input columns: {:?}", frame.get_column_names());

        let mut dates = parse_dates(
            &column_as_strings(&frame, &date_column)?,
            &self.config.date_format,
        )?;

        if self.config.sort_by_date {
            let order = chronological_order(&dates);
            if order.iter().enumerate().any(|(position, &row)| position != row) {
                debug!("Reordering rows chronologically");
                frame = take_rows(&frame, &order)?;
                dates = order.iter().map(|&row| dates[row]).collect();
            }
        }

        let (gaps, largest) = calendar_gaps(&dates, self.config.max_gap_days);
        if gaps > 0 {
            warn!(
                "{} calendar gaps longer than {} days (largest {} days); lags and windows count rows",
                gaps, self.config.max_gap_days, largest
            );
        }

        let price = column_as_f64(&frame, &self.columns.target).map_err(|_| {
            PipelineError::ColumnError(format!(
                "Price column '{}' not found or not numeric",
                self.columns.target
            ))
        })?;

        let mut history: Vec<(String, Vec<Option<f64>>)> = Vec::new();
        for &periods in &self.config.lag_periods {
            history.push((lag_column(periods), lag(&price, periods)));
        }
        for &window in &self.config.rolling_windows {
            history.push((rolling_mean_column(window), rolling_mean(&price, window)?));
            history.push((rolling_std_column(window), rolling_std(&price, window)?));
        }

        let complete: Vec<usize> = (0..frame.height())
            .filter(|&row| {
                dates[row].is_some() && history.iter().all(|(_, values)| values[row].is_some())
            })
            .collect();

        frame.with_column(Series::new(
            DAY_OF_WEEK,
            dates
                .iter()
                .map(|d| d.map(|d| d.weekday().num_days_from_monday() as i32))
                .collect::<Vec<_>>(),
        ))?;
        frame.with_column(Series::new(
            MONTH,
            dates
                .iter()
                .map(|d| d.map(|d| d.month() as i32))
                .collect::<Vec<_>>(),
        ))?;
        frame.with_column(Series::new(
            YEAR,
            dates.iter().map(|d| d.map(|d| d.year())).collect::<Vec<_>>(),
        ))?;
        for (name, values) in history {
            frame.with_column(Series::new(&name, values))?;
        }

        let before = frame.height();
        let frame = take_rows(&frame, &complete)?;
        info!(
            "Engineered {} columns, kept {} of {} rows",
            frame.width(),
            frame.height(),
            before
        );

        Ok(FeatureOutcome::Derived(frame))
    }
}

/// Derive calendar and price-history features for one entity
pub fn engineer_features(
    table: FeatureTable,
    columns: &ColumnNames,
    config: &FeatureConfig,
) -> Result<FeatureOutcome> {
    FeatureEngineer::new(columns, config).engineer(table)
}

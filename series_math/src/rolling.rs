//! Trailing window statistics
//!
//! Windows are measured in rows and include the current row, so the first
//! `window - 1` outputs are always `None`.

use crate::{MathError, Result};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Trailing window over the most recent `period` observations
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    values: VecDeque<Option<f64>>,
}

impl RollingWindow {
    /// Create a new window holding the specified number of rows
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
        })
    }

    /// Push a new observation, evicting the oldest once the window is full
    pub fn update(&mut self, value: Option<f64>) {
        self.values.push_back(value);
        if self.values.len() > self.period {
            self.values.pop_front();
        }
    }

    /// The complete window, or `None` while filling up or when a value is missing
    fn full_window(&self) -> Option<Vec<f64>> {
        if self.values.len() < self.period {
            return None;
        }
        self.values.iter().copied().collect()
    }

    /// Mean of the current window
    pub fn mean(&self) -> Option<f64> {
        self.full_window().map(|window| window.iter().mean())
    }
}

/// Sample (n - 1) standard deviation over a trailing window
#[derive(Debug, Clone)]
pub struct RollingStdDev {
    window: RollingWindow,
}

impl RollingStdDev {
    /// Create a new rolling standard deviation with the specified period
    pub fn new(period: usize) -> Result<Self> {
        Ok(Self {
            window: RollingWindow::new(period)?,
        })
    }

    /// Push a new observation
    pub fn update(&mut self, value: Option<f64>) {
        self.window.update(value);
    }

    /// Sample standard deviation of the current window.
    ///
    /// A single-row window has no sample deviation and yields `None`.
    pub fn value(&self) -> Option<f64> {
        self.window
            .full_window()
            .map(|window| window.iter().std_dev())
            .filter(|std| std.is_finite())
    }
}

/// Rolling mean of `values` over `window` rows
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    let mut rolling = RollingWindow::new(window)?;
    Ok(values
        .iter()
        .map(|&value| {
            rolling.update(value);
            rolling.mean()
        })
        .collect())
}

/// Rolling sample standard deviation of `values` over `window` rows
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    let mut rolling = RollingStdDev::new(window)?;
    Ok(values
        .iter()
        .map(|&value| {
            rolling.update(value);
            rolling.value()
        })
        .collect())
}

//! Runs the forecasting pipeline over the configured commodities.
//!
//! Without configuration the built-in defaults are used; set
//! `PRICE_FORECAST_CONFIG` to a JSON file to override them.

use anyhow::{bail, Result};
use price_forecast::{print_summary, Pipeline, PipelineConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const CONFIG_ENV: &str = "PRICE_FORECAST_CONFIG";

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            PipelineConfig::load(path)?
        }
        None => PipelineConfig::default(),
    };

    let report = Pipeline::new(config)?.run()?;
    print_summary(&report);

    let failed = report.failed().count();
    if failed > 0 {
        bail!("{} of {} entities failed", failed, report.entities.len());
    }
    Ok(())
}

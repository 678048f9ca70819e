//! # Price Forecast
//!
//! Commodity price forecasting from daily market reports.
//!
//! ## Stages
//!
//! - **Loading**: one CSV table per commodity (`data/raw/<Commodity>.csv`)
//! - **Preprocessing**: numeric columns are mean-imputed and standardised,
//!   low-cardinality categoricals one-hot encoded, high-cardinality
//!   categoricals ordinal encoded
//! - **Feature engineering**: day of week, month, year, price lags and rolling
//!   mean/standard deviation of the price
//! - **Training**: a seeded random forest on a shuffled train/test split,
//!   scored with RMSE and R²
//!
//! ## Quick Start
//!
//! ```no_run
//! use price_forecast::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig {
//!     entities: vec!["Bhindi".to_string(), "Tomato".to_string()],
//!     ..Default::default()
//! };
//! let report = Pipeline::new(config)?.run()?;
//!
//! for result in report.succeeded() {
//!     println!("{}: RMSE {:.2}", result.entity, result.evaluation.rmse);
//! }
//! # Ok::<(), price_forecast::PipelineError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod frame;
pub mod metrics;
pub mod pipeline;
pub mod preprocessing;
pub mod training;

// Re-export commonly used types
pub use crate::config::{FailurePolicy, PipelineConfig};
pub use crate::data::{DataLoader, EntityTable};
pub use crate::error::{PipelineError, Result};
pub use crate::features::{engineer_features, FeatureEngineer, FeatureOutcome};
pub use crate::metrics::Evaluation;
pub use crate::pipeline::{print_summary, EntityReport, EntityResult, Pipeline, PipelineReport};
pub use crate::preprocessing::{preprocess, FeatureTable, Preprocessor};
pub use crate::training::{train_test_split, TrainedModel, Trainer};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

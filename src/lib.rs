pub mod aggregate;
pub mod config;
pub mod error;
pub mod features;
pub mod forecast_export;
pub mod pipeline;
pub mod projection;
pub mod ranking;
pub mod regression;
pub mod run_report;
pub mod season_dataset;
pub mod season_summary;
pub mod stats;

pub use error::{ForecastError, Result};

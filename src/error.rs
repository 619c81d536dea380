use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// The trainer has nothing (or nothing useful) to fit on.
    #[error("insufficient training data ({rows} feature rows): {reason}")]
    InsufficientData { rows: usize, reason: String },

    /// No rows belong to the most recent season, so there is nothing to project.
    #[error("no rows to project for season {season}: {message}")]
    EmptyProjection { season: String, message: String },

    #[error("input is missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("invalid configuration for `{field}`: {message}")]
    Config { field: String, message: String },
}

impl ForecastError {
    /// True for the conditions a run reports and stops on without treating
    /// them as a process failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForecastError::InsufficientData { .. } | ForecastError::EmptyProjection { .. }
        )
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::ForecastRun;
use crate::regression::TrainedModel;
use crate::season_dataset::SeasonDataset;
use crate::stats::{RankedPlayer, season_start_year};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub version: u32,
    pub generated_at: String,
    pub source: PathBuf,
    pub season: String,
    pub season_start_year: Option<u16>,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub aggregate_rows: usize,
    pub feature_rows: usize,
    pub projected_rows: usize,
    pub model: TrainedModel,
    pub rankings: Vec<RankedPlayer>,
}

impl RunReport {
    pub fn new(dataset: &SeasonDataset, run: &ForecastRun) -> Self {
        Self {
            version: 1,
            generated_at: chrono::Utc::now().to_rfc3339(),
            source: dataset.source.clone(),
            season: run.season.clone(),
            season_start_year: season_start_year(&run.season),
            rows_read: dataset.rows_read,
            rows_skipped: dataset.rows_skipped,
            aggregate_rows: run.aggregates.len(),
            feature_rows: run.features.len(),
            projected_rows: run.projected.len(),
            model: run.model.clone(),
            rankings: run.rankings.clone(),
        }
    }
}

pub fn write_run_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(report).context("serialize run report")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

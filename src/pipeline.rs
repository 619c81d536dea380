//! The forecast pipeline.
//!
//! Raw records -> aggregates -> lag features -> {trained model, latest-season
//! rows} -> projections -> ranking. Each stage borrows the previous table and
//! returns a new one; the first failing stage ends the run.

use tracing::{debug, info};

use crate::aggregate::{MinutesFilter, aggregate_player_seasons};
use crate::error::{ForecastError, Result};
use crate::features::{DEFAULT_LAG_DEPTH, derive_features};
use crate::projection::project_next_season;
use crate::ranking::{CompositeWeights, DEFAULT_TOP_N, rank_players};
use crate::regression::{TrainOptions, TrainedModel, train_points_model};
use crate::stats::{
    FeatureRow, PlayerSeasonAggregate, PlayerSeasonRecord, ProjectedRow, RankedPlayer,
    latest_season,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub minutes: MinutesFilter,
    pub lag_depth: usize,
    pub train: TrainOptions,
    pub weights: CompositeWeights,
    pub top_n: usize,
    /// Season to project from. Defaults to the highest label in the raw
    /// records, taken before the playing-time filters.
    pub season: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            minutes: MinutesFilter::default(),
            lag_depth: DEFAULT_LAG_DEPTH,
            train: TrainOptions::default(),
            weights: CompositeWeights::default(),
            top_n: DEFAULT_TOP_N,
            season: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Aggregated,
    FeatureBuilt,
    Trained,
    Projected,
    Ranked,
}

/// Everything one run produced, kept for reporting and export.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub season: String,
    pub aggregates: Vec<PlayerSeasonAggregate>,
    pub features: Vec<FeatureRow>,
    pub model: TrainedModel,
    pub projected: Vec<ProjectedRow>,
    pub rankings: Vec<RankedPlayer>,
}

pub fn run(records: &[PlayerSeasonRecord], cfg: &PipelineConfig) -> Result<ForecastRun> {
    let season = cfg
        .season
        .clone()
        .or_else(|| latest_season(records).map(str::to_string));

    let aggregates = aggregate_player_seasons(records, &cfg.minutes);
    log_stage(Stage::Aggregated, aggregates.len());

    let features = derive_features(&aggregates, cfg.lag_depth);
    log_stage(Stage::FeatureBuilt, features.len());

    let model = train_points_model(&features, &cfg.train)?;
    log_stage(Stage::Trained, model.train_rows);

    let Some(season) = season else {
        return Err(ForecastError::EmptyProjection {
            season: "(none)".to_string(),
            message: "the input has no season labels".to_string(),
        });
    };
    let projected = project_next_season(&features, &season, &model.model)?;
    log_stage(Stage::Projected, projected.len());

    let rankings = rank_players(&projected, &cfg.weights, cfg.top_n);
    log_stage(Stage::Ranked, rankings.len());

    info!(
        "forecast from {} complete: {} aggregates, {} ranked, test_mse={:.3}",
        season,
        aggregates.len(),
        rankings.len(),
        model.test_mse
    );

    Ok(ForecastRun {
        season,
        aggregates,
        features,
        model,
        projected,
        rankings,
    })
}

fn log_stage(stage: Stage, rows: usize) {
    debug!(?stage, rows, "pipeline stage complete");
}

use rayon::prelude::*;
use tracing::info;

use crate::error::{ForecastError, Result};
use crate::features::projection_rows;
use crate::regression::LinearModel;
use crate::stats::{FeatureRow, ProjectedRow};

/// Predict next-season points for every player who appears in `season`.
///
/// `features` is the full historical feature table; restricting it here keeps
/// the lag values that were computed against earlier seasons.
pub fn project_next_season(
    features: &[FeatureRow],
    season: &str,
    model: &LinearModel,
) -> Result<Vec<ProjectedRow>> {
    let rows = projection_rows(features, season);
    if rows.is_empty() {
        return Err(ForecastError::EmptyProjection {
            season: season.to_string(),
            message: "no player in that season passed the playing-time filters, \
                      so there are no lag features to project from"
                .to_string(),
        });
    }

    // Collect keeps input order, so the parallel map stays deterministic.
    let projected = rows
        .par_iter()
        .map(|row| ProjectedRow {
            season: row.season.clone(),
            player: row.player.clone(),
            stats: row.stats,
            predicted_points: model.predict(&row.feature_vector()),
        })
        .collect::<Vec<_>>();

    info!(
        "projected {} players from season {}",
        projected.len(),
        season
    );
    Ok(projected)
}

use std::collections::HashMap;

use crate::stats::{FeatureRow, PlayerSeasonAggregate, StatLine};

pub const DEFAULT_LAG_DEPTH: usize = 1;

/// Attach lagged stat lines to every aggregate row.
///
/// A player's lag `d` is the row `d` places earlier in that player's own
/// season-sorted history, so a gap year does not break the chain: the lag of
/// a 2019-20 row after a missing 2018-19 is the 2017-18 row. Season labels
/// share the "YYYY-YY" format, so lexical order is chronological order.
///
/// Output keeps the (season, player) order of the aggregate table.
pub fn derive_features(aggregates: &[PlayerSeasonAggregate], lag_depth: usize) -> Vec<FeatureRow> {
    let mut by_player: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, row) in aggregates.iter().enumerate() {
        by_player.entry(row.player.as_str()).or_default().push(idx);
    }

    let mut lags_by_row: Vec<(Vec<StatLine>, usize)> =
        vec![(vec![StatLine::default(); lag_depth], 0); aggregates.len()];

    for indices in by_player.values_mut() {
        indices.sort_by(|a, b| aggregates[*a].season.cmp(&aggregates[*b].season));
        for (pos, row_idx) in indices.iter().enumerate() {
            let (lags, filled) = &mut lags_by_row[*row_idx];
            for depth in 1..=lag_depth {
                let Some(prev_pos) = pos.checked_sub(depth) else {
                    break;
                };
                lags[depth - 1] = aggregates[indices[prev_pos]].stats;
                *filled += 1;
            }
        }
    }

    aggregates
        .iter()
        .zip(lags_by_row)
        .map(|(row, (lags, prior_seasons))| FeatureRow {
            season: row.season.clone(),
            player: row.player.clone(),
            stats: row.stats,
            lags,
            prior_seasons,
        })
        .collect()
}

/// Rows of `season`, taken from a feature table whose lags were already
/// computed over the full history.
pub fn projection_rows(rows: &[FeatureRow], season: &str) -> Vec<FeatureRow> {
    rows.iter().filter(|r| r.season == season).cloned().collect()
}

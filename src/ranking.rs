use serde::{Deserialize, Serialize};

use crate::stats::{ProjectedRow, RankedPlayer};

pub const DEFAULT_TOP_N: usize = 10;

/// Weights of the actual supporting stats added to predicted points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            rebounds: 0.7,
            assists: 0.5,
            steals: 0.3,
            blocks: 0.3,
        }
    }
}

impl CompositeWeights {
    pub fn score(&self, row: &ProjectedRow) -> f64 {
        row.predicted_points
            + self.rebounds * row.stats.rebounds
            + self.assists * row.stats.assists
            + self.steals * row.stats.steals
            + self.blocks * row.stats.blocks
    }
}

/// Score every projected row and keep the best `top_n`, highest first.
/// Equal scores keep their input order.
pub fn rank_players(
    projected: &[ProjectedRow],
    weights: &CompositeWeights,
    top_n: usize,
) -> Vec<RankedPlayer> {
    let mut ranked = projected
        .iter()
        .map(|row| RankedPlayer {
            player: row.player.clone(),
            season: row.season.clone(),
            predicted_points: row.predicted_points,
            composite_score: weights.score(row),
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatLine;

    fn projected(player: &str, predicted: f64, reb: f64) -> ProjectedRow {
        ProjectedRow {
            season: "2023-24".to_string(),
            player: player.to_string(),
            stats: StatLine {
                points: 999.0,
                rebounds: reb,
                assists: 20.0,
                steals: 10.0,
                blocks: 10.0,
                minutes: 2000.0,
            },
            predicted_points: predicted,
        }
    }

    #[test]
    fn composite_uses_actual_supporting_stats() {
        let row = projected("A", 100.0, 50.0);
        let score = CompositeWeights::default().score(&row);
        assert!((score - (100.0 + 35.0 + 10.0 + 3.0 + 3.0)).abs() < 1e-9);
    }

    #[test]
    fn keeps_top_n_in_descending_order() {
        let rows = (0..15)
            .map(|i| projected(&format!("P{i:02}"), i as f64 * 10.0, 0.0))
            .collect::<Vec<_>>();
        let ranked = rank_players(&rows, &CompositeWeights::default(), DEFAULT_TOP_N);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].player, "P14");
        assert_eq!(ranked[9].player, "P05");
        assert!(
            ranked
                .windows(2)
                .all(|w| w[0].composite_score >= w[1].composite_score)
        );
    }

    #[test]
    fn fewer_rows_than_n_returns_all() {
        let rows = vec![projected("A", 1.0, 0.0), projected("B", 2.0, 0.0)];
        let ranked = rank_players(&rows, &CompositeWeights::default(), 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].player, "B");
    }

    #[test]
    fn ties_keep_input_order() {
        let rows = vec![projected("A", 5.0, 1.0), projected("B", 5.0, 1.0)];
        let ranked = rank_players(&rows, &CompositeWeights::default(), 10);
        assert_eq!(ranked[0].player, "A");
        assert_eq!(ranked[1].player, "B");
    }
}

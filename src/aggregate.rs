use std::collections::BTreeMap;

use crate::stats::{PlayerSeasonAggregate, PlayerSeasonRecord, SeasonType, StatLine};

pub const MIN_REGULAR_MINUTES: f64 = 200.0;
pub const MIN_PLAYOFF_MINUTES: f64 = 50.0;

/// Minimum playing time a row needs, per season type, to count towards totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinutesFilter {
    pub min_regular: f64,
    pub min_playoffs: f64,
}

impl Default for MinutesFilter {
    fn default() -> Self {
        Self {
            min_regular: MIN_REGULAR_MINUTES,
            min_playoffs: MIN_PLAYOFF_MINUTES,
        }
    }
}

impl MinutesFilter {
    /// Thresholds are inclusive: a row sitting exactly on the threshold is kept.
    pub fn retains(&self, record: &PlayerSeasonRecord) -> bool {
        let min = match record.season_type {
            SeasonType::Regular => self.min_regular,
            SeasonType::Playoffs => self.min_playoffs,
        };
        record.stats.minutes >= min
    }
}

/// Collapse records into one row per (season, player), summing regular season
/// and playoff totals. Output is ordered by season, then player.
pub fn aggregate_player_seasons(
    records: &[PlayerSeasonRecord],
    filter: &MinutesFilter,
) -> Vec<PlayerSeasonAggregate> {
    let mut totals: BTreeMap<(&str, &str), StatLine> = BTreeMap::new();
    for record in records.iter().filter(|r| filter.retains(r)) {
        totals
            .entry((record.season.as_str(), record.player.as_str()))
            .or_default()
            .add(&record.stats);
    }

    totals
        .into_iter()
        .map(|((season, player), stats)| PlayerSeasonAggregate {
            season: season.to_string(),
            player: player.to_string(),
            stats,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ShootingTotals;

    fn record(season: &str, kind: SeasonType, player: &str, pts: f64, min: f64) -> PlayerSeasonRecord {
        PlayerSeasonRecord {
            season: season.to_string(),
            season_type: kind,
            player: player.to_string(),
            stats: StatLine {
                points: pts,
                rebounds: 1.0,
                assists: 2.0,
                steals: 3.0,
                blocks: 4.0,
                minutes: min,
            },
            shooting: ShootingTotals::default(),
        }
    }

    #[test]
    fn drops_short_stints_per_season_type() {
        let records = vec![
            record("2020-21", SeasonType::Regular, "A", 10.0, 199.0),
            record("2020-21", SeasonType::Regular, "B", 10.0, 200.0),
            record("2020-21", SeasonType::Playoffs, "C", 10.0, 49.5),
            record("2020-21", SeasonType::Playoffs, "D", 10.0, 50.0),
        ];
        let out = aggregate_player_seasons(&records, &MinutesFilter::default());
        let players = out.iter().map(|r| r.player.as_str()).collect::<Vec<_>>();
        assert_eq!(players, vec!["B", "D"]);
    }

    #[test]
    fn merges_regular_and_playoffs_in_any_order() {
        let regular = record("2020-21", SeasonType::Regular, "A", 10.0, 1000.0);
        let playoffs = record("2020-21", SeasonType::Playoffs, "A", 5.0, 100.0);

        let forward = aggregate_player_seasons(
            &[regular.clone(), playoffs.clone()],
            &MinutesFilter::default(),
        );
        let backward = aggregate_player_seasons(&[playoffs, regular], &MinutesFilter::default());

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].stats.points, 15.0);
        assert_eq!(forward[0].stats.minutes, 1100.0);
        assert_eq!(forward[0].stats.blocks, 8.0);
    }

    #[test]
    fn playoff_row_survives_when_regular_row_is_dropped() {
        let records = vec![
            record("2020-21", SeasonType::Regular, "A", 10.0, 150.0),
            record("2020-21", SeasonType::Playoffs, "A", 5.0, 60.0),
        ];
        let out = aggregate_player_seasons(&records, &MinutesFilter::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].stats.points, 5.0);
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(aggregate_player_seasons(&[], &MinutesFilter::default()).is_empty());
    }
}

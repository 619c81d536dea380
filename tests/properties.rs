use std::collections::HashMap;

use proptest::prelude::*;

use hoops_forecast::aggregate::{MinutesFilter, aggregate_player_seasons};
use hoops_forecast::features::derive_features;
use hoops_forecast::ranking::{CompositeWeights, rank_players};
use hoops_forecast::stats::{
    PlayerSeasonRecord, ProjectedRow, SeasonType, ShootingTotals, StatLine,
};

const PLAYERS: [&str; 4] = ["Ada", "Bo", "Cy", "Di"];

// Whole-number stats keep the sums exact regardless of summation order.
fn arb_record() -> impl Strategy<Value = PlayerSeasonRecord> {
    (
        0usize..PLAYERS.len(),
        2015u16..2024,
        any::<bool>(),
        prop::array::uniform5(0u32..400),
        0u32..3000,
    )
        .prop_map(|(player, year, playoffs, counts, minutes)| PlayerSeasonRecord {
            season: format!("{year}-{:02}", (year + 1) % 100),
            season_type: if playoffs {
                SeasonType::Playoffs
            } else {
                SeasonType::Regular
            },
            player: PLAYERS[player].to_string(),
            stats: StatLine {
                points: counts[0] as f64,
                rebounds: counts[1] as f64,
                assists: counts[2] as f64,
                steals: counts[3] as f64,
                blocks: counts[4] as f64,
                minutes: minutes as f64,
            },
            shooting: ShootingTotals::default(),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_aggregation_ignores_input_order(
        records in prop::collection::vec(arb_record(), 0..40)
    ) {
        let filter = MinutesFilter::default();
        let forward = aggregate_player_seasons(&records, &filter);
        let mut reversed = records.clone();
        reversed.reverse();
        prop_assert_eq!(forward, aggregate_player_seasons(&reversed, &filter));
    }

    #[test]
    fn prop_aggregates_are_unique_and_sum_retained_rows(
        records in prop::collection::vec(arb_record(), 0..40)
    ) {
        let filter = MinutesFilter::default();
        let aggregates = aggregate_player_seasons(&records, &filter);

        for pair in aggregates.windows(2) {
            prop_assert!(
                (pair[0].season.as_str(), pair[0].player.as_str())
                    < (pair[1].season.as_str(), pair[1].player.as_str())
            );
        }
        for agg in &aggregates {
            let expected = records
                .iter()
                .filter(|r| r.season == agg.season && r.player == agg.player && filter.retains(r))
                .map(|r| r.stats.points)
                .sum::<f64>();
            prop_assert_eq!(agg.stats.points, expected);
        }
        let retained = records.iter().filter(|r| filter.retains(r)).count();
        prop_assert!(aggregates.len() <= retained);
    }

    #[test]
    fn prop_filter_keeps_only_rows_over_the_floor(
        records in prop::collection::vec(arb_record(), 0..40)
    ) {
        let filter = MinutesFilter::default();
        let kept = records
            .iter()
            .filter(|r| filter.retains(r))
            .cloned()
            .collect::<Vec<_>>();
        for record in &kept {
            let floor = match record.season_type {
                SeasonType::Regular => filter.min_regular,
                SeasonType::Playoffs => filter.min_playoffs,
            };
            prop_assert!(record.stats.minutes >= floor);
        }
        // Re-filtering a filtered set changes nothing, and neither do the totals.
        prop_assert!(kept.iter().all(|r| filter.retains(r)));
        prop_assert_eq!(
            aggregate_player_seasons(&kept, &filter),
            aggregate_player_seasons(&records, &filter)
        );
    }

    #[test]
    fn prop_lag_is_the_previous_observed_season(
        records in prop::collection::vec(arb_record(), 0..40)
    ) {
        let aggregates = aggregate_player_seasons(&records, &MinutesFilter::default());
        let features = derive_features(&aggregates, 1);
        prop_assert_eq!(features.len(), aggregates.len());

        let mut last_seen: HashMap<&str, StatLine> = HashMap::new();
        let mut ordered = features.iter().collect::<Vec<_>>();
        ordered.sort_by(|a, b| a.season.cmp(&b.season));
        for row in ordered {
            let expected = last_seen
                .get(row.player.as_str())
                .copied()
                .unwrap_or_default();
            prop_assert_eq!(row.lags[0], expected);
            prop_assert_eq!(row.has_history(), last_seen.contains_key(row.player.as_str()));
            last_seen.insert(row.player.as_str(), row.stats);
        }
    }

    #[test]
    fn prop_rankings_are_sorted_and_bounded(
        scores in prop::collection::vec((0u32..500, 0u32..200), 0..30),
        top_n in 1usize..15
    ) {
        let projected = scores
            .iter()
            .enumerate()
            .map(|(idx, (pts, reb))| ProjectedRow {
                season: "2023-24".to_string(),
                player: format!("P{idx}"),
                stats: StatLine {
                    rebounds: *reb as f64,
                    ..StatLine::default()
                },
                predicted_points: *pts as f64,
            })
            .collect::<Vec<_>>();
        let ranked = rank_players(&projected, &CompositeWeights::default(), top_n);
        prop_assert_eq!(ranked.len(), projected.len().min(top_n));
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].composite_score >= pair[1].composite_score);
        }
    }
}

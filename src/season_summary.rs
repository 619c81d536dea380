// Per-minute season summary.
//
// Season types are merged per (player, season) like the forecast aggregate,
// but without the per-type playing-time filters; rows under
// `MIN_SUMMARY_MINUTES` total minutes are dropped afterwards instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::stats::{PlayerSeasonRecord, ShootingTotals, Stat, StatLine};

pub const MIN_SUMMARY_MINUTES: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerMinuteRow {
    pub player: String,
    pub season: String,
    pub minutes: f64,
    pub points_per_min: f64,
    pub rebounds_per_min: f64,
    pub assists_per_min: f64,
    pub steals_per_min: f64,
    pub blocks_per_min: f64,
    pub fg_pct: Option<f64>,
    pub fg3_pct: Option<f64>,
    pub ft_pct: Option<f64>,
    pub fg3a_rate: Option<f64>,
    pub points_per_fga: Option<f64>,
    pub true_shooting: Option<f64>,
    pub ast_to_tov: Option<f64>,
}

pub fn per_minute_summary(records: &[PlayerSeasonRecord]) -> Vec<PerMinuteRow> {
    let mut totals: BTreeMap<(&str, &str), (StatLine, ShootingTotals)> = BTreeMap::new();
    for record in records {
        let entry = totals
            .entry((record.player.as_str(), record.season.as_str()))
            .or_default();
        entry.0.add(&record.stats);
        entry.1.add(&record.shooting);
    }

    totals
        .into_iter()
        .filter(|(_, (stats, _))| stats.minutes >= MIN_SUMMARY_MINUTES)
        .map(|((player, season), (stats, shooting))| {
            let per_min = |stat: Stat| stats.get(stat) / stats.minutes;
            PerMinuteRow {
                player: player.to_string(),
                season: season.to_string(),
                minutes: stats.minutes,
                points_per_min: per_min(Stat::Points),
                rebounds_per_min: per_min(Stat::Rebounds),
                assists_per_min: per_min(Stat::Assists),
                steals_per_min: per_min(Stat::Steals),
                blocks_per_min: per_min(Stat::Blocks),
                fg_pct: ratio(shooting.fgm, shooting.fga),
                fg3_pct: ratio(shooting.fg3m, shooting.fg3a),
                ft_pct: ratio(shooting.ftm, shooting.fta),
                fg3a_rate: ratio(shooting.fg3a, shooting.fga),
                points_per_fga: ratio(stats.points, shooting.fga),
                true_shooting: ratio(
                    0.5 * stats.points,
                    shooting.fga + 0.475 * shooting.fta,
                ),
                ast_to_tov: ratio(stats.assists, shooting.turnovers),
            }
        })
        .collect()
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    if den > 0.0 { Some(num / den) } else { None }
}

use std::fmt;

use serde::{Deserialize, Serialize};

pub const STAT_COUNT: usize = 6;

/// The counting statistics carried through aggregation and lagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Minutes,
}

impl Stat {
    pub const ALL: [Stat; STAT_COUNT] = [
        Stat::Points,
        Stat::Rebounds,
        Stat::Assists,
        Stat::Steals,
        Stat::Blocks,
        Stat::Minutes,
    ];

    /// Column label used in the input table and in derived feature names.
    pub fn column(self) -> &'static str {
        match self {
            Stat::Points => "PTS",
            Stat::Rebounds => "REB",
            Stat::Assists => "AST",
            Stat::Steals => "STL",
            Stat::Blocks => "BLK",
            Stat::Minutes => "MIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonType {
    Regular,
    Playoffs,
}

impl SeasonType {
    /// Accepts the cleaned label as well as the raw scraper spellings.
    pub fn from_label(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.eq_ignore_ascii_case("playoffs") {
            return Some(SeasonType::Playoffs);
        }
        let folded = s.replace("%20", " ").replace('_', " ").to_ascii_lowercase();
        if folded == "regular season" {
            return Some(SeasonType::Regular);
        }
        None
    }

    pub fn label(self) -> &'static str {
        match self {
            SeasonType::Regular => "Regular_season",
            SeasonType::Playoffs => "Playoffs",
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Start year encoded in a "YYYY-YY" season label.
pub fn season_start_year(label: &str) -> Option<u16> {
    let head = label.trim().get(..4)?;
    if !head.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

/// Highest season label among raw records, before any playing-time filter.
/// Labels are "YYYY-YY", so lexical order is chronological.
pub fn latest_season(records: &[PlayerSeasonRecord]) -> Option<&str> {
    records.iter().map(|r| r.season.as_str()).max()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub minutes: f64,
}

impl StatLine {
    pub fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Points => self.points,
            Stat::Rebounds => self.rebounds,
            Stat::Assists => self.assists,
            Stat::Steals => self.steals,
            Stat::Blocks => self.blocks,
            Stat::Minutes => self.minutes,
        }
    }

    pub fn add(&mut self, other: &StatLine) {
        self.points += other.points;
        self.rebounds += other.rebounds;
        self.assists += other.assists;
        self.steals += other.steals;
        self.blocks += other.blocks;
        self.minutes += other.minutes;
    }
}

/// Shooting and ball-security totals. Absent columns load as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShootingTotals {
    pub fgm: f64,
    pub fga: f64,
    pub fg3m: f64,
    pub fg3a: f64,
    pub ftm: f64,
    pub fta: f64,
    pub turnovers: f64,
}

impl ShootingTotals {
    pub fn add(&mut self, other: &ShootingTotals) {
        self.fgm += other.fgm;
        self.fga += other.fga;
        self.fg3m += other.fg3m;
        self.fg3a += other.fg3a;
        self.ftm += other.ftm;
        self.fta += other.fta;
        self.turnovers += other.turnovers;
    }
}

/// One input row: a player's totals for one season and season type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonRecord {
    pub season: String,
    pub season_type: SeasonType,
    pub player: String,
    pub stats: StatLine,
    #[serde(default)]
    pub shooting: ShootingTotals,
}

/// A player's totals for one season, regular season and playoffs merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonAggregate {
    pub season: String,
    pub player: String,
    pub stats: StatLine,
}

/// An aggregate plus the stat lines of the player's previous observed seasons.
/// `lags[0]` is lag 1, `lags[1]` lag 2, and so on; missing history is zeroed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub season: String,
    pub player: String,
    pub stats: StatLine,
    pub lags: Vec<StatLine>,
    /// How many of the lag slots hold a real prior season.
    pub prior_seasons: usize,
}

impl FeatureRow {
    /// Lag values in column order: every depth of a stat before the next stat.
    pub fn feature_vector(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(STAT_COUNT * self.lags.len());
        for stat in Stat::ALL {
            for lag in &self.lags {
                out.push(lag.get(stat));
            }
        }
        out
    }

    pub fn has_history(&self) -> bool {
        self.prior_seasons > 0
    }
}

/// Names matching `FeatureRow::feature_vector`, e.g. `PTS_lag_1`.
pub fn feature_names(lag_depth: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(STAT_COUNT * lag_depth);
    for stat in Stat::ALL {
        for depth in 1..=lag_depth {
            out.push(format!("{}_lag_{}", stat.column(), depth));
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRow {
    pub season: String,
    pub player: String,
    pub stats: StatLine,
    pub predicted_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub player: String,
    pub season: String,
    pub predicted_points: f64,
    pub composite_score: f64,
}

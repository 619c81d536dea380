// Loading of the cleaned per-season player table.
//
// One CSV row per (season, season type, player). Column names follow the
// stats feed the table was scraped from (`Year`, `Season_type`, `PLAYER`,
// `PTS`, ...). Unknown columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ForecastError, Result};
use crate::stats::{
    PlayerSeasonRecord, SeasonType, ShootingTotals, StatLine, latest_season, season_start_year,
};

pub const REQUIRED_COLUMNS: [&str; 9] = [
    "Year",
    "Season_type",
    "PLAYER",
    "PTS",
    "REB",
    "AST",
    "STL",
    "BLK",
    "MIN",
];

#[derive(Debug, Clone)]
pub struct SeasonDataset {
    pub source: PathBuf,
    pub records: Vec<PlayerSeasonRecord>,
    pub rows_read: usize,
    pub rows_skipped: usize,
}

impl SeasonDataset {
    /// Highest season label present before any filtering.
    pub fn latest_season(&self) -> Option<&str> {
        latest_season(&self.records)
    }

    pub fn seasons(&self) -> Vec<String> {
        let mut out = self
            .records
            .iter()
            .map(|r| r.season.clone())
            .collect::<Vec<_>>();
        out.sort();
        out.dedup();
        out
    }
}

#[derive(Debug, Deserialize)]
struct RawSeasonRow {
    #[serde(rename = "Year")]
    season: String,
    #[serde(rename = "Season_type")]
    season_type: String,
    #[serde(rename = "PLAYER")]
    player: String,
    #[serde(rename = "PTS")]
    points: f64,
    #[serde(rename = "REB")]
    rebounds: f64,
    #[serde(rename = "AST")]
    assists: f64,
    #[serde(rename = "STL")]
    steals: f64,
    #[serde(rename = "BLK")]
    blocks: f64,
    #[serde(rename = "MIN")]
    minutes: f64,
    #[serde(rename = "FGM", default)]
    fgm: Option<f64>,
    #[serde(rename = "FGA", default)]
    fga: Option<f64>,
    #[serde(rename = "FG3M", default)]
    fg3m: Option<f64>,
    #[serde(rename = "FG3A", default)]
    fg3a: Option<f64>,
    #[serde(rename = "FTM", default)]
    ftm: Option<f64>,
    #[serde(rename = "FTA", default)]
    fta: Option<f64>,
    #[serde(rename = "TOV", default)]
    turnovers: Option<f64>,
}

pub fn load_season_dataset(path: &Path) -> Result<SeasonDataset> {
    let file = File::open(path).map_err(|source| ForecastError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_season_dataset_from_reader(file, path)
}

/// Reader-based loader; `source` is only used for error messages and the summary.
pub fn load_season_dataset_from_reader<R: Read>(rdr: R, source: &Path) -> Result<SeasonDataset> {
    let csv_err = |err: csv::Error| ForecastError::Csv {
        path: source.to_path_buf(),
        source: err,
    };

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let headers = reader.headers().map_err(csv_err)?.clone();
    check_required_columns(headers.iter())?;

    let mut records = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;

    for (idx, result) in reader.deserialize::<RawSeasonRow>().enumerate() {
        rows_read += 1;
        // Header is line 1.
        let line = idx + 2;
        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                warn!("skipping malformed row at line {line}: {err}");
                rows_skipped += 1;
                continue;
            }
        };
        match record_from_raw(raw) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!("skipping row at line {line}: {reason}");
                rows_skipped += 1;
            }
        }
    }

    debug!(
        "loaded {} records from {} ({} skipped)",
        records.len(),
        source.display(),
        rows_skipped
    );

    Ok(SeasonDataset {
        source: source.to_path_buf(),
        records,
        rows_read,
        rows_skipped,
    })
}

fn check_required_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Result<()> {
    let present = headers.map(str::trim).collect::<Vec<_>>();
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !present.contains(col))
        .map(|col| col.to_string())
        .collect::<Vec<_>>();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ForecastError::Schema { missing })
    }
}

fn record_from_raw(raw: RawSeasonRow) -> std::result::Result<PlayerSeasonRecord, String> {
    let player = raw.player.trim().to_string();
    if player.is_empty() {
        return Err("empty player name".to_string());
    }
    let season = raw.season.trim().to_string();
    if season.is_empty() {
        return Err(format!("empty season label for '{player}'"));
    }
    if season_start_year(&season).is_none() {
        return Err(format!("season label '{season}' for '{player}' is not YYYY-YY"));
    }
    let Some(season_type) = SeasonType::from_label(&raw.season_type) else {
        return Err(format!(
            "unknown season type '{}' for '{player}'",
            raw.season_type
        ));
    };

    let stats = StatLine {
        points: raw.points,
        rebounds: raw.rebounds,
        assists: raw.assists,
        steals: raw.steals,
        blocks: raw.blocks,
        minutes: raw.minutes,
    };
    let values = [
        stats.points,
        stats.rebounds,
        stats.assists,
        stats.steals,
        stats.blocks,
        stats.minutes,
    ];
    if !values.iter().all(|v| v.is_finite()) {
        return Err(format!("non-finite stat value for '{player}'"));
    }
    if stats.minutes < 0.0 {
        return Err(format!("negative minutes ({}) for '{player}'", stats.minutes));
    }

    let shooting = ShootingTotals {
        fgm: raw.fgm.unwrap_or(0.0),
        fga: raw.fga.unwrap_or(0.0),
        fg3m: raw.fg3m.unwrap_or(0.0),
        fg3a: raw.fg3a.unwrap_or(0.0),
        ftm: raw.ftm.unwrap_or(0.0),
        fta: raw.fta.unwrap_or(0.0),
        turnovers: raw.turnovers.unwrap_or(0.0),
    };

    Ok(PlayerSeasonRecord {
        season,
        season_type,
        player,
        stats,
        shooting,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Year,Season_type,PLAYER_ID,RANK,PLAYER,TEAM,GP,MIN,FGM,FGA,FG3M,FG3A,FTM,FTA,REB,AST,STL,BLK,TOV,PTS
2022-23,Regular_season,1,1,Alpha One,AAA,70,2400,700,1400,150,400,300,350,500,400,80,40,150,1850
2022-23,Playoffs,1,1,Alpha One,AAA,10,380,100,210,20,60,40,50,70,60,12,5,25,260
2023-24,Regular%20Season,2,2,Beta Two,BBB,65,2100,600,1300,100,300,200,260,700,150,50,90,120,1500
";

    fn load(raw: &str) -> Result<SeasonDataset> {
        load_season_dataset_from_reader(raw.as_bytes(), Path::new("sample.csv"))
    }

    #[test]
    fn loads_rows_and_ignores_extra_columns() {
        let ds = load(SAMPLE).expect("sample should load");
        assert_eq!(ds.records.len(), 3);
        assert_eq!(ds.rows_skipped, 0);
        let first = &ds.records[0];
        assert_eq!(first.player, "Alpha One");
        assert_eq!(first.season_type, SeasonType::Regular);
        assert_eq!(first.stats.points, 1850.0);
        assert_eq!(first.shooting.fga, 1400.0);
        assert_eq!(ds.records[2].season_type, SeasonType::Regular);
        assert_eq!(ds.latest_season(), Some("2023-24"));
        assert_eq!(ds.seasons(), vec!["2022-23".to_string(), "2023-24".to_string()]);
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let raw = "Year,Season_type,PLAYER,PTS,REB,AST,STL\n2022-23,Playoffs,X,1,1,1,1\n";
        match load(raw) {
            Err(ForecastError::Schema { missing }) => {
                assert_eq!(missing, vec!["BLK".to_string(), "MIN".to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn bad_rows_are_skipped_not_fatal() {
        let raw = "\
Year,Season_type,PLAYER,PTS,REB,AST,STL,BLK,MIN
2022-23,Preseason,Gamma,10,1,1,1,1,300
2022-23,Playoffs,Delta,abc,1,1,1,1,300
2022-23,Playoffs,Eps,10,1,1,1,1,-5
2022-23,Playoffs,Zeta,10,1,1,1,1,60
";
        let ds = load(raw).expect("should load");
        assert_eq!(ds.rows_read, 4);
        assert_eq!(ds.rows_skipped, 3);
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.records[0].player, "Zeta");
        assert_eq!(ds.records[0].shooting, ShootingTotals::default());
    }

    #[test]
    fn non_year_season_labels_are_skipped() {
        let raw = "\
Year,Season_type,PLAYER,PTS,REB,AST,STL,BLK,MIN
2022-23,Regular_season,Alpha,10,1,1,1,1,300
TOTAL,Regular_season,Alpha,10,1,1,1,1,300
,Playoffs,Beta,10,1,1,1,1,60
";
        let ds = load(raw).expect("should load");
        assert_eq!(ds.rows_read, 3);
        assert_eq!(ds.rows_skipped, 2);
        assert_eq!(ds.latest_season(), Some("2022-23"));
    }
}

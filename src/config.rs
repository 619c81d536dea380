// Run configuration: defaults, then `FORECAST_*` environment variables
// (optionally from `.env` / `.env.local`), then command-line flags.

use std::path::PathBuf;
use std::str::FromStr;

use crate::aggregate::{MIN_PLAYOFF_MINUTES, MIN_REGULAR_MINUTES, MinutesFilter};
use crate::error::{ForecastError, Result};
use crate::features::DEFAULT_LAG_DEPTH;
use crate::pipeline::PipelineConfig;
use crate::ranking::{CompositeWeights, DEFAULT_TOP_N};
use crate::regression::{DEFAULT_SEED, DEFAULT_TEST_FRACTION, TrainOptions};

pub const DEFAULT_INPUT: &str = "data/nba_player_data_cleaned.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub input: PathBuf,
    /// Season to project from; the latest season in the input when unset.
    pub season: Option<String>,
    pub seed: u64,
    pub test_fraction: f64,
    pub lag_depth: usize,
    pub top_n: usize,
    pub min_regular_minutes: f64,
    pub min_playoff_minutes: f64,
    pub export_xlsx: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
    pub parallelism: Option<usize>,
    pub quiet: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            season: None,
            seed: DEFAULT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
            lag_depth: DEFAULT_LAG_DEPTH,
            top_n: DEFAULT_TOP_N,
            min_regular_minutes: MIN_REGULAR_MINUTES,
            min_playoff_minutes: MIN_PLAYOFF_MINUTES,
            export_xlsx: None,
            report_json: None,
            parallelism: None,
            quiet: false,
        }
    }
}

impl ForecastConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut cfg = Self::default();
        if let Some(v) = get("FORECAST_INPUT") {
            cfg.input = PathBuf::from(v);
        }
        cfg.season = get("FORECAST_SEASON");
        if let Some(v) = get("FORECAST_SEED") {
            cfg.seed = parse_field("FORECAST_SEED", &v)?;
        }
        if let Some(v) = get("FORECAST_TEST_FRACTION") {
            cfg.test_fraction = parse_field("FORECAST_TEST_FRACTION", &v)?;
        }
        if let Some(v) = get("FORECAST_LAG_DEPTH") {
            cfg.lag_depth = parse_field("FORECAST_LAG_DEPTH", &v)?;
        }
        if let Some(v) = get("FORECAST_TOP_N") {
            cfg.top_n = parse_field("FORECAST_TOP_N", &v)?;
        }
        if let Some(v) = get("FORECAST_MIN_REGULAR_MINUTES") {
            cfg.min_regular_minutes = parse_field("FORECAST_MIN_REGULAR_MINUTES", &v)?;
        }
        if let Some(v) = get("FORECAST_MIN_PLAYOFF_MINUTES") {
            cfg.min_playoff_minutes = parse_field("FORECAST_MIN_PLAYOFF_MINUTES", &v)?;
        }
        cfg.export_xlsx = get("FORECAST_EXPORT_XLSX").map(PathBuf::from);
        cfg.report_json = get("FORECAST_REPORT_JSON").map(PathBuf::from);
        if let Some(v) = get("FORECAST_PARALLELISM") {
            cfg.parallelism = Some(parse_field("FORECAST_PARALLELISM", &v)?);
        }
        Ok(cfg)
    }

    /// Apply `--flag value` / `--flag=value` overrides.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        let mut idx = 0;
        while idx < args.len() {
            let arg = args[idx].as_str();
            idx += 1;
            if arg == "--quiet" || arg == "-q" {
                self.quiet = true;
                continue;
            }
            let Some(flag) = arg.strip_prefix("--") else {
                return Err(config_err(arg, "unexpected positional argument"));
            };
            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name, value.to_string()),
                None => {
                    let Some(next) = args.get(idx) else {
                        return Err(config_err(arg, "missing value"));
                    };
                    idx += 1;
                    (flag, next.clone())
                }
            };
            let value = value.trim();
            match name {
                "input" => self.input = PathBuf::from(value),
                "season" => self.season = Some(value.to_string()),
                "seed" => self.seed = parse_field("--seed", value)?,
                "test-fraction" => self.test_fraction = parse_field("--test-fraction", value)?,
                "lag-depth" => self.lag_depth = parse_field("--lag-depth", value)?,
                "top" => self.top_n = parse_field("--top", value)?,
                "xlsx" => self.export_xlsx = Some(PathBuf::from(value)),
                "report" => self.report_json = Some(PathBuf::from(value)),
                "threads" => self.parallelism = Some(parse_field("--threads", value)?),
                _ => return Err(config_err(arg, "unknown flag")),
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(config_err(
                "test_fraction",
                &format!("must be between 0 and 1 exclusive, got {}", self.test_fraction),
            ));
        }
        if self.lag_depth == 0 {
            return Err(config_err("lag_depth", "must be at least 1"));
        }
        if self.top_n == 0 {
            return Err(config_err("top_n", "must be at least 1"));
        }
        if !(self.min_regular_minutes >= 0.0) {
            return Err(config_err("min_regular_minutes", "must be non-negative"));
        }
        if !(self.min_playoff_minutes >= 0.0) {
            return Err(config_err("min_playoff_minutes", "must be non-negative"));
        }
        if self.parallelism == Some(0) {
            return Err(config_err("parallelism", "must be at least 1"));
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            minutes: MinutesFilter {
                min_regular: self.min_regular_minutes,
                min_playoffs: self.min_playoff_minutes,
            },
            lag_depth: self.lag_depth,
            train: TrainOptions {
                test_fraction: self.test_fraction,
                seed: self.seed,
            },
            weights: CompositeWeights::default(),
            top_n: self.top_n,
            season: self.season.clone(),
        }
    }
}

fn parse_field<T: FromStr>(field: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| config_err(field, &format!("cannot parse '{raw}': {err}")))
}

fn config_err(field: &str, message: &str) -> ForecastError {
    ForecastError::Config {
        field: field.to_string(),
        message: message.to_string(),
    }
}

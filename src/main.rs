use anyhow::{Context, Result};
use tracing::{info, warn};

use hoops_forecast::config::ForecastConfig;
use hoops_forecast::forecast_export::export_forecast_xlsx;
use hoops_forecast::pipeline::{self, ForecastRun, PipelineConfig};
use hoops_forecast::ranking::CompositeWeights;
use hoops_forecast::run_report::{RunReport, write_run_report};
use hoops_forecast::season_dataset::load_season_dataset;
use hoops_forecast::season_summary::per_minute_summary;
use hoops_forecast::stats::PlayerSeasonRecord;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing()?;

    let mut cfg = ForecastConfig::from_env()?;
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    cfg.apply_args(&args)?;
    cfg.validate()?;

    let dataset = load_season_dataset(&cfg.input)?;
    info!(
        "loaded {} rows from {} ({} skipped, seasons {:?})",
        dataset.records.len(),
        cfg.input.display(),
        dataset.rows_skipped,
        dataset.seasons()
    );

    let pipeline_cfg = cfg.pipeline_config();
    let run = match run_forecast(&dataset.records, &pipeline_cfg, cfg.parallelism) {
        Ok(run) => run,
        Err(err) if err.is_recoverable() => {
            warn!("forecast stopped: {err}");
            println!("No forecast: {err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if !cfg.quiet {
        print_rankings(&run, &pipeline_cfg.weights);
    }

    if let Some(path) = &cfg.export_xlsx {
        let per_minute = per_minute_summary(&dataset.records);
        let report = export_forecast_xlsx(path, &run, &per_minute)?;
        println!(
            "workbook written: {} ({} ranked, {} projected, {} per-minute rows)",
            path.display(),
            report.rankings,
            report.projections,
            report.per_minute
        );
    }

    if let Some(path) = &cfg.report_json {
        write_run_report(path, &RunReport::new(&dataset, &run))?;
        println!("report written: {}", path.display());
    }

    Ok(())
}

fn print_rankings(run: &ForecastRun, weights: &CompositeWeights) {
    println!("Top {} players projected from {}", run.rankings.len(), run.season);
    println!(
        "{:>4}  {:<28} {:>14} {:>16}",
        "Rank", "Player", "Predicted PTS", "Composite"
    );
    for (idx, player) in run.rankings.iter().enumerate() {
        println!(
            "{:>4}  {:<28} {:>14.1} {:>16.1}",
            idx + 1,
            player.player,
            player.predicted_points,
            player.composite_score
        );
    }
    println!();
    println!(
        "Model: {} train rows, {} test rows, test MSE {:.2}",
        run.model.train_rows, run.model.test_rows, run.model.test_mse
    );
    println!(
        "Composite = predicted PTS + {} * REB + {} * AST + {} * STL + {} * BLK",
        weights.rebounds, weights.assists, weights.steals, weights.blocks
    );
    println!(
        "Points are predicted from each player's previous-season totals; the \
         supporting stats are the player's actual totals in {}.",
        run.season
    );
}

/// Run the pipeline, on a dedicated projection pool when a thread count is set.
fn run_forecast(
    records: &[PlayerSeasonRecord],
    cfg: &PipelineConfig,
    threads: Option<usize>,
) -> hoops_forecast::Result<ForecastRun> {
    let Some(threads) = threads else {
        return pipeline::run(records, cfg);
    };
    let built = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.clamp(1, 64))
        .thread_name(|idx| format!("forecast-{idx}"))
        .build();
    match built {
        Ok(pool) => {
            info!("projecting on {} threads", pool.current_num_threads());
            pool.install(|| pipeline::run(records, cfg))
        }
        Err(err) => {
            warn!("thread pool unavailable ({err}), using the global pool");
            pipeline::run(records, cfg)
        }
    }
}

fn init_tracing() -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hoops_forecast=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use f1stats_core::{load_enriched, run_all, AnalysisConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod charts;
mod output;

const DATA_DIR_ENV: &str = "F1STATS_DATA_DIR";

/// Exploratory statistics over the Formula 1 historical CSV export.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding lap_times.csv, results.csv, driver_standings.csv, drivers.csv,
    /// races.csv and qualifying.csv. Defaults to $F1STATS_DATA_DIR, then the working directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// TOML file overriding analysis thresholds.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "charts")]
    chart_dir: PathBuf,
    /// Skip writing chart files.
    #[arg(long)]
    no_charts: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir);

    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let data = load_enriched(&data_dir)
        .with_context(|| format!("failed to load F1 tables from {}", data_dir.display()))?;
    let report = run_all(&data, &config);

    match cli.format {
        OutputFormat::Text => output::print_report(&report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    let mut chart_failures = 0usize;
    if cli.no_charts {
        info!("chart rendering skipped");
    } else {
        for chart in report.charts() {
            match charts::render_bar_chart(&chart, &cli.chart_dir) {
                Ok(path) => info!(chart = chart.slug, path = %path.display(), "chart written"),
                Err(err) => {
                    error!(chart = chart.slug, error = %err, "chart rendering failed");
                    chart_failures += 1;
                }
            }
        }
    }

    if !report.failures.is_empty() || chart_failures > 0 {
        bail!(
            "{} analyses and {} charts failed",
            report.failures.len(),
            chart_failures
        );
    }
    Ok(())
}

fn resolve_data_dir(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

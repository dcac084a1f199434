//! demandcast CLI — run one batch inference pass from the command line.
//!
//! Invoked with no arguments it performs a full run with configured
//! defaults, suitable for a cron entry. Every flag is optional and only
//! overrides the layered configuration.

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use demandcast_core::config::{self, ForecastConfig};
use demandcast_core::pipeline;

/// Scheduled batch inference for sales-demand forecasting
#[derive(Parser, Debug)]
#[command(name = "demandcast", version, about, long_about = None)]
struct Cli {
    /// Workspace directory for config resolution
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// First day of the forecast window (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    anchor_date: Option<NaiveDate>,

    /// Number of consecutive days to forecast
    #[arg(long)]
    horizon: Option<i64>,

    /// Registered model name
    #[arg(short, long)]
    model: Option<String>,

    /// Model alias to resolve
    #[arg(short, long)]
    alias: Option<String>,

    /// Directory to write result files to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn config_overrides(&self) -> ForecastConfig {
        let mut overrides = ForecastConfig::default();
        if let Some(model) = &self.model {
            overrides.model.name = model.clone();
        }
        if let Some(alias) = &self.alias {
            overrides.model.alias = alias.clone();
        }
        if let Some(horizon) = self.horizon {
            overrides.forecast.horizon_days = horizon;
        }
        if let Some(dir) = &self.output_dir {
            overrides.output.dir = dir.clone();
        }
        overrides
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let overrides = cli.config_overrides();
    let config = config::load_config(Some(&cli.workspace), Some(&overrides))
        .context("failed to load configuration")?;

    let anchor_date = cli
        .anchor_date
        .unwrap_or_else(|| Local::now().date_naive());

    tracing::info!(anchor_date = %anchor_date, "Starting batch inference");
    let report = pipeline::run_batch_inference(&config, anchor_date)
        .context("batch inference run failed")?;

    if !cli.quiet {
        println!(
            "Forecasted {} days with '{}' v{} (run {}); results in {}",
            report.rows,
            report.model_name,
            report.version,
            report.run_id,
            report.output_path.display()
        );
    }
    Ok(())
}

//! # Tide Pool Temperature Report
//!
//! Prints one line per tide-pool location: `<name>: OK` when the day's lowest
//! tide could be paired with an hourly temperature forecast, or a diagnostic
//! naming the failed stage otherwise. Logs go to stderr, results to stdout.

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tidetemp_lib::{client::ApiClient, config::Config, driver};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "tidetemp",
    version,
    about = "Lowest tide of the day and the air temperature at that hour, per tide pool"
)]
struct Cli {
    /// Configuration file (default: ./tidetemp-config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Day to report on, YYYY-MM-DD (default: today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Include tide time, height and temperature in OK lines
    #[arg(long)]
    detailed: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(verbose: bool, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("tidetemp=debug,tidetemp_lib=debug,info")
        } else {
            EnvFilter::new("tidetemp=info,tidetemp_lib=warn,warn")
        }
    });

    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .init(),
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };

    let locations = config.location_table();
    let client = Arc::new(ApiClient::new(&config.api)?);
    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    info!(%date, locations = locations.len(), "fetching tide and forecast data");

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().context("starting tokio runtime")?;

    let detailed = cli.detailed;
    let stdout = std::io::stdout();
    let results = rt.block_on(driver::run(client, &locations, date, |result| {
        let line = if detailed {
            result.detailed_line()
        } else {
            result.to_string()
        };
        if let Err(e) = writeln!(stdout.lock(), "{line}") {
            warn!(location = %result.name, error = %e, "failed to write result line");
        }
    }));

    let ok = results.iter().filter(|r| r.is_ok()).count();
    info!(ok, failed = results.len() - ok, "done");

    // Per-location failures are reported above, not through the exit status
    Ok(())
}

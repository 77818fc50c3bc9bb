//! CLI entry point for the air-quality snapshot tool.
//!
//! Provides subcommands for refreshing the current snapshot, archiving a
//! daily snapshot into the historical index, and logging a station summary.

use airq_snapshot::analyzers::analyzer::{
    analyze, daily_file_name, log_station_summaries, publish_current, publish_daily,
};
use airq_snapshot::analyzers::snapshot::SnapshotKind;
use airq_snapshot::{
    config::Settings,
    fetch::load_source,
    output::{append_record, print_json},
    parser::{RawReading, parse_feed},
    stats::RunStats,
};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "airq_snapshot")]
#[command(about = "Builds air-quality GeoJSON snapshots from the Gijón open-data feed", long_about = None)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    /// CSV file to append one row per run to
    #[arg(long, global = true, value_name = "FILE")]
    run_log: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the current snapshot from the latest feed
    Current {
        /// Path to file or URL to fetch (defaults to the open-data endpoint)
        #[arg(short, long, value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// GeoJSON file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Archive a dated snapshot and record it in the historical index
    Daily {
        /// Path to file or URL to fetch (defaults to the open-data endpoint)
        #[arg(short, long, value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// Snapshot date, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Directory holding the daily snapshots and index.json
        #[arg(long)]
        history_dir: Option<PathBuf>,
    },
    /// Log per-station levels without writing any snapshot
    Summary {
        /// Path to file or URL to fetch (defaults to the open-data endpoint)
        #[arg(short, long, value_name = "FILE_OR_URL")]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/airq_snapshot.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("airq_snapshot.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.config.as_deref())?;
    let run_log = cli.run_log.or_else(|| settings.run_log.clone());

    let now = Local::now();
    let reference = now.naive_local();
    let horizon = settings.stale_after_days;

    match cli.command {
        Commands::Current { source, output } => {
            let source = source.unwrap_or_else(|| settings.data_url.clone());
            let output = output.unwrap_or_else(|| settings.current_path.clone());

            let readings = fetch_readings(&source).await?;
            let analysis = publish_current(&readings, &output, reference, horizon)?;
            log_station_summaries(&analysis.snapshot);

            let stats = RunStats::new(
                SnapshotKind::Current,
                analysis.filter,
                analysis.stations,
                analysis.snapshot.len(),
            )
            .with_source(&source)
            .with_output(&output.display().to_string());
            record_run(run_log.as_deref(), &stats);

            info!(stations = analysis.snapshot.len(), "Update complete");
        }
        Commands::Daily {
            source,
            date,
            history_dir,
        } => {
            let source = source.unwrap_or_else(|| settings.data_url.clone());
            let history_dir = history_dir.unwrap_or_else(|| settings.history_dir.clone());
            let date = date.unwrap_or_else(|| now.date_naive());
            info!(date = %date, file = %daily_file_name(date), "Daily pollution snapshot");

            let readings = fetch_readings(&source).await?;
            let publication = publish_daily(&readings, &history_dir, date, reference, horizon)?;

            let stats = RunStats::new(
                SnapshotKind::Daily(date),
                publication.analysis.filter,
                publication.analysis.stations,
                publication.analysis.snapshot.len(),
            )
            .with_source(&source)
            .with_output(&publication.snapshot_path.display().to_string());
            record_run(run_log.as_deref(), &stats);

            info!(
                total_periods = publication.index.total_periods,
                "Daily snapshot complete"
            );
        }
        Commands::Summary { source } => {
            let source = source.unwrap_or_else(|| settings.data_url.clone());

            let readings = fetch_readings(&source).await?;
            let analysis = analyze(&readings, SnapshotKind::Current, reference, horizon)?;
            log_station_summaries(&analysis.snapshot);

            let stats = RunStats::new(
                SnapshotKind::Current,
                analysis.filter,
                analysis.stations,
                analysis.snapshot.len(),
            )
            .with_source(&source);
            record_run(run_log.as_deref(), &stats);
            print_json(&stats)?;
        }
    }

    Ok(())
}

/// Fetches and decodes the feed. Any failure here aborts the run before
/// anything is written.
async fn fetch_readings(source: &str) -> Result<Vec<RawReading>> {
    let bytes = load_source(source).await?;
    let readings = parse_feed(&bytes)?;
    info!(readings = readings.len(), "Feed parsed");
    Ok(readings)
}

/// Logs the run's filter outcome and appends it to the CSV log, if one is
/// configured. Outputs are already written at this point, so a failure is only
/// logged.
fn record_run(run_log: Option<&Path>, stats: &RunStats) {
    info!(
        kind = %stats.kind,
        total = stats.total_readings,
        stale_pct = format!("{:.1}", stats.stale_pct()),
        "Readings filtered"
    );
    let Some(path) = run_log else {
        return;
    };
    if let Err(e) = append_record(path, stats) {
        error!(path = %path.display(), error = %e, "Failed to append run log");
    }
}

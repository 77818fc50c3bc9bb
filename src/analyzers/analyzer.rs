use crate::analyzers::aggregate::aggregate_readings;
use crate::analyzers::filter::{FilterStats, FreshnessFilter, retain_fresh};
use crate::analyzers::snapshot::{Snapshot, SnapshotKind, build_snapshot};
use crate::index::{HistoricalIndex, IndexEntry, Upsert};
use crate::output::write_json;
use crate::parser::RawReading;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the archived snapshot for `date`.
pub fn daily_file_name(date: NaiveDate) -> String {
    format!("pollution-{}.geojson", date.format("%Y-%m-%d"))
}

/// Result of one filter → aggregate → score → build pass.
#[derive(Debug)]
pub struct Analysis {
    pub snapshot: Snapshot,
    pub filter: FilterStats,
    pub stations: usize,
}

/// Runs the whole pipeline over one feed. `reference` is the processing time
/// the staleness horizon is measured from.
#[tracing::instrument(skip(readings, kind), fields(readings = readings.len(), kind = kind.name()))]
pub fn analyze(
    readings: &[RawReading],
    kind: SnapshotKind,
    reference: NaiveDateTime,
    horizon_days: i64,
) -> Result<Analysis> {
    let filter = FreshnessFilter::new(reference, horizon_days)?;
    let (fresh, stats) = retain_fresh(readings, &filter);

    if stats.stale > 0 {
        warn!(stale = stats.stale, horizon_days, "Filtered out stale readings");
    }
    info!(valid = stats.valid, "Using valid readings");

    let table = aggregate_readings(fresh);
    info!(stations = table.len(), "Processed stations");

    let snapshot = build_snapshot(readings, &table, kind);

    Ok(Analysis {
        snapshot,
        filter: stats,
        stations: table.len(),
    })
}

/// Logs one line per station with its level and headline pollutants.
pub fn log_station_summaries(snapshot: &Snapshot) {
    info!(stations = snapshot.len(), "Station details");
    for (name, m) in snapshot.summaries() {
        info!(
            station = name,
            level = m.aqi_level.label(),
            pm25 = m.pm25_avg,
            no2 = m.no2_avg,
            "Station summary"
        );
    }
}

/// Builds the current snapshot and writes it to `output`.
#[tracing::instrument(skip_all, fields(output = %output.display()))]
pub fn publish_current(
    readings: &[RawReading],
    output: &Path,
    reference: NaiveDateTime,
    horizon_days: i64,
) -> Result<Analysis> {
    let analysis = analyze(readings, SnapshotKind::Current, reference, horizon_days)?;
    write_json(output, &analysis.snapshot)?;
    info!(features = analysis.snapshot.len(), "Current snapshot saved");
    Ok(analysis)
}

/// Outcome of a daily archive run.
#[derive(Debug)]
pub struct DailyPublication {
    pub analysis: Analysis,
    pub snapshot_path: PathBuf,
    pub index: HistoricalIndex,
    pub upsert: Upsert,
}

/// Builds the snapshot for `date`, writes it into `history_dir` and records it
/// in `history_dir/index.json`.
///
/// The existing index is loaded and updated before anything is written, so a
/// corrupt index aborts the run with the archive untouched.
#[tracing::instrument(skip_all, fields(history_dir = %history_dir.display(), date = %date))]
pub fn publish_daily(
    readings: &[RawReading],
    history_dir: &Path,
    date: NaiveDate,
    reference: NaiveDateTime,
    horizon_days: i64,
) -> Result<DailyPublication> {
    let analysis = analyze(readings, SnapshotKind::Daily(date), reference, horizon_days)?;

    let file_name = daily_file_name(date);
    let snapshot_path = history_dir.join(&file_name);
    let index_path = history_dir.join("index.json");

    let mut index = HistoricalIndex::load(&index_path)?;
    let upsert = index.upsert_entry(IndexEntry::daily(date, file_name));

    write_json(&snapshot_path, &analysis.snapshot)?;
    info!(path = %snapshot_path.display(), "Snapshot saved");

    write_json(&index_path, &index)?;
    match upsert {
        Upsert::Replaced(_) => info!(date = %date, "Updated existing index entry"),
        Upsert::Inserted(_) => info!(date = %date, "Added new index entry"),
    }
    info!(total_periods = index.total_periods, "Index updated");

    Ok(DailyPublication {
        analysis,
        snapshot_path,
        index,
        upsert,
    })
}

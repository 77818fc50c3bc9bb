use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::filter::FilterStats;
use crate::analyzers::snapshot::SnapshotKind;

/// One row of the optional run log.
#[derive(Debug, Default, Serialize)]
pub struct RunStats {
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub source: String,
    pub total_readings: usize,
    pub stale_readings: usize,
    pub valid_readings: usize,
    pub stations: usize,
    pub features: usize,
    pub output: Option<String>,
}

impl RunStats {
    pub fn new(kind: SnapshotKind, filter: FilterStats, stations: usize, features: usize) -> Self {
        RunStats {
            timestamp: Utc::now(),
            kind: kind.name().to_string(),
            total_readings: filter.total(),
            stale_readings: filter.stale,
            valid_readings: filter.valid,
            stations,
            features,
            ..Default::default()
        }
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn stale_pct(&self) -> f64 {
        Self::pct(self.stale_readings, self.total_readings)
    }

    /// Set where the readings came from.
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    /// Set the snapshot document written by the run.
    pub fn with_output(mut self, output: &str) -> Self {
        self.output = Some(output.to_string());
        self
    }
}

//! Recency filter applied to raw readings before aggregation.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use crate::analyzers::types::IsoDate;
use crate::parser::RawReading;

/// Readings older than this many days are considered stale.
pub const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Largest accepted horizon, one hundred years.
pub const MAX_HORIZON_DAYS: i64 = 36_500;

/// Decides whether a reading is recent enough to aggregate.
///
/// A reading is only rejected when its date parses and falls strictly before
/// `reference - horizon`. Missing or unreadable dates are admitted.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessFilter {
    cutoff: NaiveDateTime,
}

impl FreshnessFilter {
    /// Fails when the cutoff cannot be represented, e.g. for a horizon of
    /// billions of days.
    pub fn new(reference: NaiveDateTime, horizon_days: i64) -> Result<Self> {
        let cutoff = TimeDelta::try_days(horizon_days)
            .and_then(|horizon| reference.checked_sub_signed(horizon))
            .with_context(|| format!("staleness horizon of {horizon_days} days is out of range"))?;
        Ok(Self { cutoff })
    }

    pub fn cutoff(&self) -> NaiveDateTime {
        self.cutoff
    }

    pub fn admits(&self, date: Option<&str>) -> bool {
        match date.filter(|d| !d.is_empty()).and_then(IsoDate::parse) {
            Some(day) => day.date().and_time(NaiveTime::MIN) >= self.cutoff,
            None => true,
        }
    }
}

/// Diagnostic counters for one filtering pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub stale: usize,
    pub valid: usize,
}

impl FilterStats {
    pub fn total(&self) -> usize {
        self.stale + self.valid
    }
}

/// Keeps the fresh readings, counting how many were dropped as stale.
pub fn retain_fresh<'a>(
    readings: &'a [RawReading],
    filter: &FreshnessFilter,
) -> (Vec<&'a RawReading>, FilterStats) {
    let mut stats = FilterStats::default();
    let mut kept = Vec::new();

    for reading in readings {
        if filter.admits(reading.date.as_deref()) {
            stats.valid += 1;
            kept.push(reading);
        } else {
            stats.stale += 1;
        }
    }

    (kept, stats)
}

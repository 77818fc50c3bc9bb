//! Chronological catalog of the daily snapshot archive (`index.json`).
//!
//! The archive also holds monthly, weekly and gap periods written by other
//! tools. Those are kept as raw JSON and only their `date` key is read, so a
//! daily run never rewrites or rejects them.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

use crate::analyzers::types::IsoDate;

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Time span covered by one archived snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub date: IsoDate,
    /// Human-readable label, e.g. `"7 Marzo 2024"`.
    pub display: String,
    pub file: String,
    pub granularity: Granularity,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Keys this tool does not write, kept as found.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IndexEntry {
    pub fn daily(date: NaiveDate, file: impl Into<String>) -> Self {
        let date = IsoDate::from(date);
        Self {
            date,
            display: display_date(date),
            file: file.into(),
            granularity: Granularity::Daily,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            extra: Map::new(),
        }
    }
}

/// `"<day> <Spanish month name> <year>"`
pub fn display_date(date: IsoDate) -> String {
    let month = MONTH_NAMES[date.month() as usize - 1];
    format!("{} {} {}", date.day(), month, date.year())
}

/// One element of `periods`: a fully dated entry, or anything else the
/// archive holds (`"2024-11"` months, file-less gaps) passed through as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Period {
    Entry(IndexEntry),
    Foreign(Value),
}

impl Period {
    /// The `date` string used for matching and ordering; empty when absent.
    pub fn date_key(&self) -> Cow<'_, str> {
        match self {
            Period::Entry(e) => Cow::Owned(e.date.to_string()),
            Period::Foreign(v) => {
                Cow::Borrowed(v.get("date").and_then(Value::as_str).unwrap_or(""))
            }
        }
    }

    pub fn entry(&self) -> Option<&IndexEntry> {
        match self {
            Period::Entry(e) => Some(e),
            Period::Foreign(_) => None,
        }
    }
}

/// Result of [`HistoricalIndex::upsert_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Replaced(usize),
    Inserted(usize),
}

/// Ordered set of archived snapshots, unique and ascending by date.
///
/// `total_periods` always equals `periods.len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalIndex {
    pub total_periods: usize,
    pub periods: Vec<Period>,
    /// Read by the map viewer; carried through untouched.
    #[serde(default)]
    pub granularity_summary: Map<String, Value>,
}

impl HistoricalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the index at `path`, or an empty one if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No index yet, starting empty");
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read index {}", path.display()))?;
        let index = serde_json::from_str(&content)
            .with_context(|| format!("index {} is not valid", path.display()))?;
        Ok(index)
    }

    /// Replaces the period with the same date in place, or inserts it before
    /// the first later date. Dates compare as `YYYY-MM-DD` strings, so
    /// `"2024-11"` sorts before any day of November.
    pub fn upsert_entry(&mut self, entry: IndexEntry) -> Upsert {
        let key = entry.date.to_string();
        let outcome = match self.periods.iter().position(|p| p.date_key() == key) {
            Some(pos) => {
                self.periods[pos] = Period::Entry(entry);
                Upsert::Replaced(pos)
            }
            None => {
                let pos = self
                    .periods
                    .iter()
                    .position(|p| p.date_key().as_ref() > key.as_str())
                    .unwrap_or(self.periods.len());
                self.periods.insert(pos, Period::Entry(entry));
                Upsert::Inserted(pos)
            }
        };
        self.total_periods = self.periods.len();
        outcome
    }

    pub fn upsert(mut self, entry: IndexEntry) -> Self {
        self.upsert_entry(entry);
        self
    }

    pub fn get(&self, date: IsoDate) -> Option<&IndexEntry> {
        self.entries().find(|e| e.date == date)
    }

    /// Dated entries in index order, skipping foreign periods.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.periods.iter().filter_map(Period::entry)
    }
}

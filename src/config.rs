use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::PathBuf;

use crate::analyzers::filter::{DEFAULT_HORIZON_DAYS, MAX_HORIZON_DAYS};

/// Gijón open-data endpoint for the hourly air-quality dataset.
pub const DEFAULT_DATA_URL: &str = "https://opendata.gijon.es/descargar.php?id=1&tipo=JSON";

/// Where the feed comes from and where snapshots go.
///
/// Loaded from an optional JSON file; any field left out keeps its default:
/// ```json
/// {
///   "data_url": "https://opendata.gijon.es/descargar.php?id=1&tipo=JSON",
///   "current_path": "data/pollution.geojson",
///   "history_dir": "historical-pollution",
///   "stale_after_days": 30,
///   "run_log": "logs/runs.csv"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_url: String,
    pub current_path: PathBuf,
    pub history_dir: PathBuf,
    pub stale_after_days: i64,
    pub run_log: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            current_path: PathBuf::from("data/pollution.geojson"),
            history_dir: PathBuf::from("historical-pollution"),
            stale_after_days: DEFAULT_HORIZON_DAYS,
            run_log: None,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {path}"))?;
        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("config {path} is not valid"))?;
        settings.validated()
    }

    /// Starts from `path` (or the defaults) and applies `AIRQ_DATA_URL` and
    /// `AIRQ_STALE_DAYS` from the environment.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.with_env(|key| std::env::var(key).ok())
    }

    fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("AIRQ_DATA_URL").filter(|u| !u.is_empty()) {
            self.data_url = url;
        }
        if let Some(days) = lookup("AIRQ_STALE_DAYS") {
            self.stale_after_days = days
                .trim()
                .parse()
                .with_context(|| format!("AIRQ_STALE_DAYS must be a whole number, got `{days}`"))?;
        }
        self.validated()
    }

    fn validated(self) -> Result<Self> {
        ensure!(
            (0..=MAX_HORIZON_DAYS).contains(&self.stale_after_days),
            "stale_after_days must be between 0 and {MAX_HORIZON_DAYS}, got {}",
            self.stale_after_days
        );
        Ok(self)
    }
}

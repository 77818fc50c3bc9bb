//! GeoJSON feature collections built from station aggregates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analyzers::aggregate::StationTable;
use crate::analyzers::grade::{AqiColor, AqiLevel, AqiResult};
use crate::analyzers::types::{IsoDate, StationAggregate, StationId};
use crate::analyzers::utility::round1;
use crate::parser::RawReading;

/// Which snapshot a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Whole-feed summary with no date dimension.
    Current,
    /// Summary for one calendar day, normally the run date.
    Daily(NaiveDate),
}

impl SnapshotKind {
    pub fn name(&self) -> &'static str {
        match self {
            SnapshotKind::Current => "current",
            SnapshotKind::Daily(_) => "daily",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl Point {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: P,
    pub geometry: Point,
}

impl<P> Feature<P> {
    pub fn new(properties: P, geometry: Point) -> Self {
        Self {
            kind: "Feature".to_string(),
            properties,
            geometry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// Rounded averages and the AQI classification shared by both snapshot kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub pm25_avg: Option<f64>,
    pub pm10_avg: Option<f64>,
    pub no2_avg: Option<f64>,
    pub o3_avg: Option<f64>,
    pub aqi_score: Option<f64>,
    pub aqi_level: AqiLevel,
    pub color: AqiColor,
}

impl Measurements {
    pub fn from_aggregate(aggregate: &StationAggregate) -> Self {
        let aqi = AqiResult::compute(aggregate.pm25, aggregate.pm10, aggregate.no2);
        Self {
            pm25_avg: aggregate.pm25.map(round1),
            pm10_avg: aggregate.pm10.map(round1),
            no2_avg: aggregate.no2.map(round1),
            o3_avg: aggregate.o3.map(round1),
            aqi_score: aqi.score.map(round1),
            aqi_level: aqi.level,
            color: aqi.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentProperties {
    pub station_id: StationId,
    pub name: String,
    #[serde(flatten)]
    pub measurements: Measurements,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProperties {
    pub station_id: StationId,
    pub name: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub date: IsoDate,
    #[serde(flatten)]
    pub measurements: Measurements,
    /// `"YYYY-MM-DD HH:00"` of the most recent dated reading.
    pub latest_reading: Option<String>,
}

/// A built snapshot, ready to be written as a GeoJSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Snapshot {
    Current(FeatureCollection<CurrentProperties>),
    Daily(FeatureCollection<DailyProperties>),
}

impl Snapshot {
    pub fn len(&self) -> usize {
        match self {
            Snapshot::Current(c) => c.features.len(),
            Snapshot::Daily(c) => c.features.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Station name and measurements of every feature, in output order.
    pub fn summaries(&self) -> Vec<(&str, &Measurements)> {
        match self {
            Snapshot::Current(c) => c
                .features
                .iter()
                .map(|f| (f.properties.name.as_str(), &f.properties.measurements))
                .collect(),
            Snapshot::Daily(c) => c
                .features
                .iter()
                .map(|f| (f.properties.name.as_str(), &f.properties.measurements))
                .collect(),
        }
    }
}

fn current_feature(aggregate: &StationAggregate) -> Feature<CurrentProperties> {
    Feature::new(
        CurrentProperties {
            station_id: aggregate.station_id.clone(),
            name: aggregate.name.clone(),
            measurements: Measurements::from_aggregate(aggregate),
        },
        Point::new(aggregate.longitude, aggregate.latitude),
    )
}

fn daily_feature(aggregate: &StationAggregate, date: IsoDate) -> Feature<DailyProperties> {
    Feature::new(
        DailyProperties {
            station_id: aggregate.station_id.clone(),
            name: aggregate.name.clone(),
            year: date.year(),
            month: date.month(),
            day: date.day(),
            date,
            measurements: Measurements::from_aggregate(aggregate),
            latest_reading: aggregate.latest.map(|o| o.to_string()),
        },
        Point::new(aggregate.longitude, aggregate.latitude),
    )
}

/// Builds the feature collection for `kind`.
///
/// The current snapshot walks the raw feed again and emits each station the
/// first time its id appears; stations with no fresh reading have no entry in
/// `table` and are skipped. The daily snapshot follows the table's own
/// first-seen order.
pub fn build_snapshot(
    readings: &[RawReading],
    table: &StationTable,
    kind: SnapshotKind,
) -> Snapshot {
    match kind {
        SnapshotKind::Current => {
            let mut seen: HashSet<&StationId> = HashSet::new();
            let features = readings
                .iter()
                .filter(|r| seen.insert(&r.station_id))
                .filter_map(|r| table.get(&r.station_id))
                .map(|station| current_feature(&station.finish()))
                .collect();
            Snapshot::Current(FeatureCollection::new(features))
        }
        SnapshotKind::Daily(date) => {
            let date = IsoDate::from(date);
            let features = table
                .iter()
                .map(|station| daily_feature(&station.finish(), date))
                .collect();
            Snapshot::Daily(FeatureCollection::new(features))
        }
    }
}

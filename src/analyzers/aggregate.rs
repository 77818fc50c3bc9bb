use crate::analyzers::types::{IsoDate, Observation, StationAggregate, StationId};
use crate::analyzers::utility::mean;
use crate::parser::RawReading;
use std::collections::HashMap;

/// Pollutants collected for every station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    O3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 4] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::O3,
    ];

    fn raw(self, reading: &RawReading) -> Option<&str> {
        match self {
            Pollutant::Pm25 => reading.pm25.as_deref(),
            Pollutant::Pm10 => reading.pm10.as_deref(),
            Pollutant::No2 => reading.no2.as_deref(),
            Pollutant::O3 => reading.o3.as_deref(),
        }
    }
}

/// Parses a pollutant field. Blank, non-numeric and non-finite values yield `None`.
pub fn parse_value(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Running state for one station during a single aggregation pass.
#[derive(Debug, Clone)]
pub struct StationAccumulator {
    pub station_id: StationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pm25: Vec<f64>,
    pub pm10: Vec<f64>,
    pub no2: Vec<f64>,
    pub o3: Vec<f64>,
    pub latest: Option<Observation>,
}

impl StationAccumulator {
    /// Seeds a station from the first reading seen for it.
    fn seed(reading: &RawReading) -> Self {
        Self {
            station_id: reading.station_id.clone(),
            name: reading.title.clone(),
            latitude: reading.latitude,
            longitude: reading.longitude,
            pm25: Vec::new(),
            pm10: Vec::new(),
            no2: Vec::new(),
            o3: Vec::new(),
            latest: None,
        }
    }

    fn series_mut(&mut self, pollutant: Pollutant) -> &mut Vec<f64> {
        match pollutant {
            Pollutant::Pm25 => &mut self.pm25,
            Pollutant::Pm10 => &mut self.pm10,
            Pollutant::No2 => &mut self.no2,
            Pollutant::O3 => &mut self.o3,
        }
    }

    /// Folds one reading's values and timestamp. Name and coordinates are left untouched.
    fn absorb(&mut self, reading: &RawReading) {
        for pollutant in Pollutant::ALL {
            if let Some(value) = parse_value(pollutant.raw(reading)) {
                self.series_mut(pollutant).push(value);
            }
        }

        let Some(date) = reading.date.as_deref().and_then(IsoDate::parse) else {
            return;
        };
        let observed = Observation {
            date,
            period: reading.period,
        };
        if self.latest.is_none_or(|latest| observed > latest) {
            self.latest = Some(observed);
        }
    }

    pub fn finish(&self) -> StationAggregate {
        StationAggregate {
            station_id: self.station_id.clone(),
            name: self.name.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            pm25: mean(&self.pm25),
            pm10: mean(&self.pm10),
            no2: mean(&self.no2),
            o3: mean(&self.o3),
            latest: self.latest,
        }
    }
}

/// Accumulators keyed by station id, iterated in first-seen order.
#[derive(Debug, Default)]
pub struct StationTable {
    stations: Vec<StationAccumulator>,
    positions: HashMap<StationId, usize>,
}

impl StationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, reading: &RawReading) {
        let index = match self.positions.get(&reading.station_id) {
            Some(&index) => index,
            None => {
                self.stations.push(StationAccumulator::seed(reading));
                let index = self.stations.len() - 1;
                self.positions.insert(reading.station_id.clone(), index);
                index
            }
        };
        self.stations[index].absorb(reading);
    }

    pub fn get(&self, station_id: &StationId) -> Option<&StationAccumulator> {
        self.positions.get(station_id).map(|&i| &self.stations[i])
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationAccumulator> {
        self.stations.iter()
    }
}

/// Groups readings by station in a single linear pass.
pub fn aggregate_readings<'a, I>(readings: I) -> StationTable
where
    I: IntoIterator<Item = &'a RawReading>,
{
    let mut table = StationTable::new();
    for reading in readings {
        table.fold(reading);
    }
    table
}

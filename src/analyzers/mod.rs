//! Reading aggregation and air-quality scoring.
//!
//! Raw readings are filtered by recency, grouped per station, averaged per
//! pollutant, scored against EU limit values and assembled into GeoJSON
//! snapshots. The same pipeline serves the current snapshot and the dated
//! daily archive.

pub mod aggregate;
pub mod analyzer;
pub mod filter;
pub mod grade;
pub mod snapshot;
pub mod types;
pub mod utility;

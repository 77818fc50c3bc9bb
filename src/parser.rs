//! JSON parser for the municipal air-quality feed.
//!
//! The provider nests readings under
//! `calidadairemediatemporales.calidadairemediatemporal`. Numeric fields may
//! arrive as numbers, numeric strings, empty strings or be missing entirely;
//! decoding keeps them as raw text so the aggregator can decide what counts
//! as a valid value.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::analyzers::types::StationId;

#[derive(Debug, Deserialize)]
struct FeedDocument {
    #[serde(rename = "calidadairemediatemporales")]
    readings: ReadingList,
}

#[derive(Debug, Deserialize)]
struct ReadingList {
    #[serde(rename = "calidadairemediatemporal")]
    items: Vec<RawReading>,
}

/// One station reading for one hour slot, exactly as published.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawReading {
    #[serde(rename = "estacion")]
    pub station_id: StationId,
    #[serde(rename = "título")]
    pub title: String,
    #[serde(rename = "latitud", deserialize_with = "coordinate")]
    pub latitude: f64,
    #[serde(rename = "longitud", deserialize_with = "coordinate")]
    pub longitude: f64,
    #[serde(rename = "fecha", default, deserialize_with = "raw_text")]
    pub date: Option<String>,
    #[serde(rename = "periodo", default, deserialize_with = "period")]
    pub period: u32,
    #[serde(default, deserialize_with = "raw_text")]
    pub pm25: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub pm10: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub no2: Option<String>,
    #[serde(default, deserialize_with = "raw_text")]
    pub o3: Option<String>,
}

/// Decodes the provider's JSON document into its flat list of readings.
///
/// # Errors
///
/// Returns an error if the bytes are not JSON or do not follow the feed
/// schema (missing station key, name or coordinates).
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawReading>> {
    let doc: FeedDocument =
        serde_json::from_slice(bytes).context("feed does not match the expected schema")?;
    Ok(doc.readings.items)
}

/// Accepts strings verbatim and renders numbers as text; null becomes `None`.
fn raw_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("coordinate out of range: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid coordinate `{s}`"))),
        other => Err(D::Error::custom(format!("invalid coordinate {other}"))),
    }
}

/// Hour slot; anything missing or unreadable falls back to slot 0.
fn period<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|p| u32::try_from(p).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(items: &str) -> Vec<u8> {
        format!(
            r#"{{"calidadairemediatemporales":{{"calidadairemediatemporal":[{items}]}}}}"#
        )
        .into_bytes()
    }

    #[test]
    fn test_parse_full_reading() {
        let bytes = wrap(
            r#"{"estacion":1,"título":"Avenida Constitución","latitud":43.529,"longitud":-5.673,
                "fecha":"2024-05-01","periodo":14,"pm25":"12","pm10":"21.5","no2":"","so2":"3"}"#,
        );
        let readings = parse_feed(&bytes).unwrap();
        assert_eq!(readings.len(), 1);

        let r = &readings[0];
        assert_eq!(r.station_id, StationId::Number(1));
        assert_eq!(r.title, "Avenida Constitución");
        assert!((r.latitude - 43.529).abs() < 1e-9);
        assert!((r.longitude + 5.673).abs() < 1e-9);
        assert_eq!(r.date.as_deref(), Some("2024-05-01"));
        assert_eq!(r.period, 14);
        assert_eq!(r.pm25.as_deref(), Some("12"));
        assert_eq!(r.pm10.as_deref(), Some("21.5"));
        assert_eq!(r.no2.as_deref(), Some(""));
        assert_eq!(r.o3, None);
    }

    #[test]
    fn test_parse_tolerates_loose_types() {
        let bytes = wrap(
            r#"{"estacion":"10","título":"Castilla","latitud":"43.54","longitud":"-5.65",
                "fecha":null,"periodo":"7","pm25":8.25,"o3":null}"#,
        );
        let r = &parse_feed(&bytes).unwrap()[0];
        assert_eq!(r.station_id, StationId::Text("10".into()));
        assert_eq!(r.latitude, 43.54);
        assert_eq!(r.date, None);
        assert_eq!(r.period, 7);
        assert_eq!(r.pm25.as_deref(), Some("8.25"));
        assert_eq!(r.o3, None);
    }

    #[test]
    fn test_missing_period_defaults_to_zero() {
        let bytes = wrap(r#"{"estacion":2,"título":"x","latitud":1,"longitud":2,"periodo":"late"}"#);
        let readings = parse_feed(&bytes).unwrap();
        assert_eq!(readings[0].period, 0);

        let bytes = wrap(r#"{"estacion":2,"título":"x","latitud":1,"longitud":2}"#);
        assert_eq!(parse_feed(&bytes).unwrap()[0].period, 0);
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_feed(&wrap("")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_schema() {
        assert!(parse_feed(b"{\"features\":[]}").is_err());
        assert!(parse_feed(b"not json").is_err());
        let bytes = wrap(r#"{"estacion":2,"título":"x","latitud":"north","longitud":2}"#);
        assert!(parse_feed(&bytes).is_err());
    }
}

use airq_snapshot::analyzers::analyzer::{analyze, publish_current, publish_daily};
use airq_snapshot::analyzers::filter::FilterStats;
use airq_snapshot::analyzers::snapshot::SnapshotKind;
use airq_snapshot::index::HistoricalIndex;
use airq_snapshot::parser::parse_feed;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fs;

fn sample_readings() -> Vec<airq_snapshot::parser::RawReading> {
    let bytes = include_bytes!("fixtures/sample_feed.json");
    parse_feed(bytes).expect("Failed to parse feed")
}

fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(18, 30, 0)
        .unwrap()
}

fn properties(snapshot: &Value, station_id: i64) -> &Value {
    snapshot["features"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["properties"]["station_id"] == station_id)
        .map(|f| &f["properties"])
        .unwrap()
}

#[test]
fn test_full_pipeline_current() {
    let readings = sample_readings();
    assert_eq!(readings.len(), 7);

    let analysis = analyze(&readings, SnapshotKind::Current, reference(), 30).unwrap();
    // Montevil's only reading is from March.
    assert_eq!(analysis.filter, FilterStats { stale: 1, valid: 6 });
    assert_eq!(analysis.stations, 3);

    let value = serde_json::to_value(&analysis.snapshot).unwrap();
    let ids: Vec<i64> = value["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["properties"]["station_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 4]);

    let constitucion = properties(&value, 1);
    assert_eq!(constitucion["name"], "Avenida Constitución");
    assert_eq!(constitucion["pm25_avg"], 12.0);
    assert_eq!(constitucion["pm10_avg"], 30.0);
    assert_eq!(constitucion["no2_avg"], 40.0);
    assert_eq!(constitucion["o3_avg"], Value::Null);
    // (48 + 60 + 100) / 3
    assert_eq!(constitucion["aqi_score"], 69.3);
    assert_eq!(constitucion["aqi_level"], "Moderate");
    assert_eq!(constitucion["color"], "yellow");
    assert_eq!(
        value["features"][0]["geometry"]["coordinates"],
        serde_json::json!([-5.673, 43.529])
    );

    let argentina = properties(&value, 2);
    assert_eq!(argentina["o3_avg"], 63.0);
    // (20 + 40 + 25) / 3
    assert_eq!(argentina["aqi_score"], 28.3);
    assert_eq!(argentina["aqi_level"], "Good");

    let santa_barbara = properties(&value, 4);
    assert_eq!(santa_barbara["o3_avg"], 70.0);
    assert_eq!(santa_barbara["aqi_score"], Value::Null);
    assert_eq!(santa_barbara["aqi_level"], "No data");
    assert_eq!(santa_barbara["color"], "gray");
}

#[test]
fn test_full_pipeline_daily_archive() {
    let dir = std::env::temp_dir().join("airq_snapshot_integration_archive");
    let _ = fs::remove_dir_all(&dir);

    let readings = sample_readings();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let yesterday = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();

    publish_daily(&readings, &dir, today, reference(), 30).unwrap();
    publish_daily(&readings, &dir, yesterday, reference(), 30).unwrap();
    publish_daily(&readings, &dir, today, reference(), 30).unwrap();

    let index = HistoricalIndex::load(&dir.join("index.json")).unwrap();
    assert_eq!(index.total_periods, 2);
    let files: Vec<&str> = index.entries().map(|e| e.file.as_str()).collect();
    assert_eq!(
        files,
        vec!["pollution-2024-05-31.geojson", "pollution-2024-06-01.geojson"]
    );
    assert_eq!(index.periods[1].entry().unwrap().display, "1 Junio 2024");

    let raw = fs::read_to_string(dir.join("pollution-2024-06-01.geojson")).unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["features"].as_array().unwrap().len(), 3);

    let constitucion = properties(&value, 1);
    assert_eq!(constitucion["date"], "2024-06-01");
    assert_eq!(constitucion["year"], 2024);
    assert_eq!(constitucion["month"], 6);
    assert_eq!(constitucion["day"], 1);
    // The unparseable "31/05/2024" reading never moves the marker.
    assert_eq!(constitucion["latest_reading"], "2024-06-01 11:00");

    let argentina = properties(&value, 2);
    assert_eq!(argentina["latest_reading"], "2024-06-01 01:00");

    let santa_barbara = properties(&value, 4);
    assert_eq!(santa_barbara["latest_reading"], Value::Null);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_station_vanishes_when_all_readings_are_stale() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let feed = format!(
        r#"{{"calidadairemediatemporales": {{"calidadairemediatemporal": [
            {{"estacion": "A", "título": "A", "latitud": 43.5, "longitud": -5.6, "fecha": "{today}", "pm25": "30"}},
            {{"estacion": "A", "título": "A", "latitud": 43.5, "longitud": -5.6, "fecha": "{today}", "pm25": ""}},
            {{"estacion": "B", "título": "B", "latitud": 43.6, "longitud": -5.7, "fecha": "2024-04-01", "pm25": "5"}}
        ]}}}}"#
    );
    let readings = parse_feed(feed.as_bytes()).unwrap();

    let path = std::env::temp_dir().join("airq_snapshot_integration_current.geojson");
    let analysis = publish_current(&readings, &path, reference(), 30).unwrap();
    assert_eq!(analysis.filter, FilterStats { stale: 1, valid: 2 });

    let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let features = value["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);

    let props = &features[0]["properties"];
    assert_eq!(props["station_id"], "A");
    assert_eq!(props["pm25_avg"], 30.0);
    assert_eq!(props["aqi_score"], 120.0);
    assert_eq!(props["aqi_level"], "Very Poor");
    assert_eq!(props["color"], "red");

    fs::remove_file(&path).unwrap();
}

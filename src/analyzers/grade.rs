//! Composite air-quality index and its severity bands.

use serde::{Deserialize, Serialize};

/// EU limit values (µg/m³) used as normalisation denominators.
pub const PM25_LIMIT: f64 = 25.0;
pub const PM10_LIMIT: f64 = 50.0;
pub const NO2_LIMIT: f64 = 40.0;

/// Computes the simplified AQI as the mean of each pollutant's percentage of
/// its EU limit. O3 is reported elsewhere but never scored.
///
/// An average of exactly `0.0` is treated the same as a missing one, matching
/// the scores already published in the historical archive.
pub fn score(pm25: Option<f64>, pm10: Option<f64>, no2: Option<f64>) -> Option<f64> {
    let sub_scores: Vec<f64> = [(pm25, PM25_LIMIT), (pm10, PM10_LIMIT), (no2, NO2_LIMIT)]
        .into_iter()
        .filter_map(|(avg, limit)| avg.filter(|v| *v != 0.0).map(|v| v / limit * 100.0))
        .collect();

    if sub_scores.is_empty() {
        return None;
    }

    Some(sub_scores.iter().sum::<f64>() / sub_scores.len() as f64)
}

/// Severity band for an AQI score.
///
/// | Score           | Level     | Color  |
/// |-----------------|-----------|--------|
/// | none            | No data   | gray   |
/// | < 50            | Good      | green  |
/// | 50 ..< 75       | Moderate  | yellow |
/// | 75 ..< 100      | Poor      | orange |
/// | >= 100          | Very Poor | red    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiLevel {
    #[serde(rename = "No data")]
    NoData,
    Good,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
}

/// Map marker colour paired with each [`AqiLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AqiColor {
    Gray,
    Green,
    Yellow,
    Orange,
    Red,
}

impl AqiLevel {
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            None => AqiLevel::NoData,
            Some(s) if s < 50.0 => AqiLevel::Good,
            Some(s) if s < 75.0 => AqiLevel::Moderate,
            Some(s) if s < 100.0 => AqiLevel::Poor,
            Some(_) => AqiLevel::VeryPoor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AqiLevel::NoData => "No data",
            AqiLevel::Good => "Good",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::Poor => "Poor",
            AqiLevel::VeryPoor => "Very Poor",
        }
    }

    pub fn color(self) -> AqiColor {
        match self {
            AqiLevel::NoData => AqiColor::Gray,
            AqiLevel::Good => AqiColor::Green,
            AqiLevel::Moderate => AqiColor::Yellow,
            AqiLevel::Poor => AqiColor::Orange,
            AqiLevel::VeryPoor => AqiColor::Red,
        }
    }
}

/// Score and band computed together for one station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AqiResult {
    pub score: Option<f64>,
    pub level: AqiLevel,
}

impl AqiResult {
    pub fn compute(pm25: Option<f64>, pm10: Option<f64>, no2: Option<f64>) -> Self {
        let score = score(pm25, pm10, no2);
        Self {
            score,
            level: AqiLevel::from_score(score),
        }
    }

    pub fn color(&self) -> AqiColor {
        self.level.color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_at_eu_limits() {
        assert_eq!(score(Some(25.0), Some(50.0), Some(40.0)), Some(100.0));
    }

    #[test]
    fn test_score_absent() {
        assert_eq!(score(None, None, None), None);
    }

    #[test]
    fn test_score_single_pollutant() {
        assert_eq!(score(None, Some(25.0), None), Some(50.0));
        assert_eq!(score(None, None, Some(20.0)), Some(50.0));
    }

    #[test]
    fn test_score_treats_zero_as_absent() {
        assert_eq!(score(Some(0.0), None, None), None);
        assert_eq!(score(Some(0.0), Some(50.0), None), Some(100.0));
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(AqiLevel::from_score(None), AqiLevel::NoData);
        assert_eq!(AqiLevel::from_score(Some(0.0)), AqiLevel::Good);
        assert_eq!(AqiLevel::from_score(Some(49.9)), AqiLevel::Good);
        assert_eq!(AqiLevel::from_score(Some(50.0)), AqiLevel::Moderate);
        assert_eq!(AqiLevel::from_score(Some(74.9)), AqiLevel::Moderate);
        assert_eq!(AqiLevel::from_score(Some(75.0)), AqiLevel::Poor);
        assert_eq!(AqiLevel::from_score(Some(99.9)), AqiLevel::Poor);
        assert_eq!(AqiLevel::from_score(Some(100.0)), AqiLevel::VeryPoor);
        assert_eq!(AqiLevel::from_score(Some(420.0)), AqiLevel::VeryPoor);
    }

    #[test]
    fn test_labels_and_colors() {
        let very_poor = AqiLevel::from_score(Some(100.0));
        assert_eq!((very_poor.label(), very_poor.color()), ("Very Poor", AqiColor::Red));
        let good = AqiLevel::from_score(Some(49.9));
        assert_eq!((good.label(), good.color()), ("Good", AqiColor::Green));
        assert_eq!(AqiLevel::NoData.color(), AqiColor::Gray);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&AqiLevel::VeryPoor).unwrap(), "\"Very Poor\"");
        assert_eq!(serde_json::to_string(&AqiLevel::NoData).unwrap(), "\"No data\"");
        assert_eq!(serde_json::to_string(&AqiColor::Gray).unwrap(), "\"gray\"");
    }

    #[test]
    fn test_result_compute() {
        let r = AqiResult::compute(Some(30.0), None, None);
        assert_eq!(r.level, AqiLevel::VeryPoor);
        assert_eq!(r.color(), AqiColor::Red);
        assert!((r.score.unwrap() - 120.0).abs() < 1e-9);
    }
}

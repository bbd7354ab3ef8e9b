use serde::{Deserialize, Serialize};
use weatherly_core::Units;

use crate::error::WeatherError;

/// Current conditions as returned by `/data/2.5/weather`.
///
/// Only the fields the report prints are modelled; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub main: MainReadings,
    pub weather: Vec<Condition>,
    pub wind: Wind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    /// Relative humidity, percent
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

impl WeatherReport {
    /// Parse a JSON payload, requiring at least one `weather` entry.
    pub fn from_json(body: &str) -> Result<Self, WeatherError> {
        let report: WeatherReport = serde_json::from_str(body)
            .map_err(|e| WeatherError::MalformedResponse(e.to_string()))?;

        if report.weather.is_empty() {
            return Err(WeatherError::MalformedResponse(
                "missing field `weather[0]`".to_string(),
            ));
        }

        Ok(report)
    }

    pub fn to_json(&self) -> Result<String, WeatherError> {
        serde_json::to_string(self).map_err(|e| WeatherError::Unexpected(e.to_string()))
    }

    /// Description of the primary condition (`weather[0].description`).
    pub fn description(&self) -> &str {
        self.weather
            .first()
            .map(|c| c.description.as_str())
            .unwrap_or_default()
    }
}

/// Where a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    Cache,
    Fresh,
}

/// A successful lookup.
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub report: WeatherReport,
    pub source: ReportSource,
    /// Validated (trimmed) city name
    pub city: String,
    pub units: Units,
}

impl LookupOutcome {
    pub fn is_cached(&self) -> bool {
        self.source == ReportSource::Cache
    }
}

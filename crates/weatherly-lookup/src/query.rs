//! Query validation and cache key derivation.

use weatherly_core::Units;

use crate::error::WeatherError;

const CACHE_KEY_PREFIX: &str = "weather";

/// One lookup request as parsed from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub city: String,
    pub units: Units,
}

impl Query {
    pub fn new(city: impl Into<String>, units: Units) -> Self {
        Self {
            city: city.into(),
            units,
        }
    }
}

/// Validate a raw city name and return it trimmed.
///
/// Only ASCII letters, whitespace, and hyphens are accepted.
pub fn validate_city(raw: &str) -> Result<String, WeatherError> {
    let city = raw.trim();

    if city.is_empty() {
        return Err(WeatherError::InvalidInput(
            "City name cannot be empty".to_string(),
        ));
    }

    let allowed = |c: char| c.is_ascii_alphabetic() || c.is_whitespace() || c == '-';
    if !city.chars().all(allowed) {
        return Err(WeatherError::InvalidInput(
            "City name can only contain letters, spaces, and hyphens".to_string(),
        ));
    }

    Ok(city.to_string())
}

/// Cache slot for a city/units pair: `weather_<lowercased city>_<units>`.
pub fn cache_key_for(city: &str, units: Units) -> String {
    format!("{}_{}_{}", CACHE_KEY_PREFIX, city.to_lowercase(), units.as_str())
}

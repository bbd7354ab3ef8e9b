//! OpenWeather current-conditions client.

use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use weatherly_core::{NetworkError, ReqwestErrorExt, Units};

use crate::error::WeatherError;
use crate::types::WeatherReport;

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";
const USER_AGENT: &str = concat!("weatherly/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Arc<Client>,
    base_url: String,
}

impl OpenWeatherClient {
    /// Build a client for the API at `base_url` (scheme and host, no path).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Unexpected(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current conditions for `city`.
    ///
    /// Issues exactly one GET; there are no retries.
    #[instrument(skip(self, api_key), level = "debug")]
    pub async fn current(
        &self,
        city: &str,
        units: Units,
        api_key: &str,
    ) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);
        tracing::debug!("GET {} q={} units={}", url, city, units);

        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", units.as_str())])
            .send()
            .await
            .map_err(|e| classify_fault(city, e.into_network_error()))?;

        let status = response.status();
        tracing::debug!("Weather API responded {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(WeatherError::RateLimited);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::CityNotFound(city.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
            let message = if detail.is_empty() {
                status.to_string()
            } else {
                format!("{} ({})", status, detail)
            };
            return Err(classify_fault(
                city,
                NetworkError::ServerError {
                    status: status.as_u16(),
                    message,
                },
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_fault(city, e.into_network_error()))?;

        WeatherReport::from_json(&body)
    }
}

/// Map a transport or HTTP failure onto the lookup taxonomy.
///
/// A 404 status is the primary not-found signal; a `Not Found` substring in
/// the message is honoured as a fallback.
fn classify_fault(city: &str, err: NetworkError) -> WeatherError {
    let message = err.to_string();
    if err.status() == Some(404) || message.contains("Not Found") {
        WeatherError::CityNotFound(city.to_string())
    } else {
        WeatherError::FetchFailed(message)
    }
}

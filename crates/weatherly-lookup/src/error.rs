//! Lookup error types.

use thiserror::Error;

use weatherly_core::config::API_KEY_ENV;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("OPENWEATHER_API_KEY is not set")]
    MissingCredential,

    #[error("Rate limited by weather API")]
    RateLimited,

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl WeatherError {
    /// The single line written to stderr for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => format!("Invalid input: {}", msg),
            Self::MissingCredential => {
                format!("Error: {} environment variable is not set", API_KEY_ENV)
            }
            Self::RateLimited => "Rate limit exceeded. Please try again later.".to_string(),
            Self::CityNotFound(city) => format!(
                "City \"{}\" not found. Please check the spelling and try again.",
                city
            ),
            Self::FetchFailed(msg) => format!("Error fetching weather data: {}", msg),
            Self::MalformedResponse(msg) => format!("Error parsing weather data: {}", msg),
            Self::Unexpected(msg) => format!("Unexpected error: {}", msg),
        }
    }
}

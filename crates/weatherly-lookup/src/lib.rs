//! Current-weather lookup for weatherly
//!
//! Validates a city query, serves it from a TTL cache when possible, and
//! otherwise fetches current conditions from the OpenWeather API.

pub mod types;
pub mod cache;
pub mod error;
pub mod format;
pub mod lookup;
pub mod provider;
pub mod query;

pub use types::*;
pub use cache::{CacheError, CacheStore, MemoryCache, SqliteCache};
pub use error::WeatherError;
pub use format::{format_outcome, format_report, CACHE_NOTICE, REPORT_LINE_COUNT};
pub use lookup::{check_request, WeatherLookup, DEFAULT_CACHE_TTL};
pub use provider::OpenWeatherClient;
pub use query::{cache_key_for, validate_city, Query};

//! The lookup pipeline: validate, check the cache, fetch on miss, store.

use std::time::Duration;

use crate::cache::CacheStore;
use crate::error::WeatherError;
use crate::provider::OpenWeatherClient;
use crate::query::{cache_key_for, validate_city, Query};
use crate::types::{LookupOutcome, ReportSource, WeatherReport};

/// How long a fetched report stays in the cache unless configured otherwise.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Checks that need no I/O: a valid city and a non-blank API key.
///
/// Returns the trimmed city and key. Callers that own a cache should run this
/// before opening it.
pub fn check_request<'k>(
    query: &Query,
    api_key: Option<&'k str>,
) -> Result<(String, &'k str), WeatherError> {
    let city = validate_city(&query.city)?;

    let api_key = api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(WeatherError::MissingCredential)?;

    Ok((city, api_key))
}

/// Resolves a [`Query`] to a report, from cache when possible.
///
/// All collaborators are injected: the API client, the cache store, and the
/// API key.
pub struct WeatherLookup<C> {
    client: OpenWeatherClient,
    cache: C,
    api_key: Option<String>,
    ttl: Duration,
}

impl<C: CacheStore> WeatherLookup<C> {
    pub fn new(client: OpenWeatherClient, cache: C, api_key: Option<String>) -> Self {
        Self {
            client,
            cache,
            api_key,
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Override the lifetime of stored reports.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Run one lookup.
    ///
    /// # Errors
    /// `InvalidInput` and `MissingCredential` are raised before any cache or
    /// network access. On a cache miss the API errors (`RateLimited`,
    /// `CityNotFound`, `FetchFailed`, `MalformedResponse`) propagate and
    /// nothing is cached.
    pub async fn lookup(&self, query: &Query) -> Result<LookupOutcome, WeatherError> {
        let (city, api_key) = check_request(query, self.api_key.as_deref())?;

        let key = cache_key_for(&city, query.units);

        if let Some(report) = self.read_cached(&key) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(LookupOutcome {
                report,
                source: ReportSource::Cache,
                city,
                units: query.units,
            });
        }

        tracing::debug!("Cache miss for {}", key);
        let report = self.client.current(&city, query.units, api_key).await?;
        self.store(&key, &report);

        Ok(LookupOutcome {
            report,
            source: ReportSource::Fresh,
            city,
            units: query.units,
        })
    }

    /// Cache read that degrades to a miss on storage or decode failure.
    fn read_cached(&self, key: &str) -> Option<WeatherReport> {
        let payload = match self.cache.get(key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match WeatherReport::from_json(&payload) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!("Ignoring undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn store(&self, key: &str, report: &WeatherReport) {
        let payload = match report.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Could not encode report for {}: {}", key, e);
                return;
            }
        };

        match self.cache.set(key, &payload, self.ttl) {
            Ok(()) => tracing::debug!("Cached {} for {}s", key, self.ttl.as_secs()),
            Err(e) => tracing::warn!("Cache write failed for {}: {}", key, e),
        }
    }
}

//! weatherly: current weather for a city, from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};

use weatherly_core::{Config, ConfigError, Units};
use weatherly_lookup::{
    check_request, format_outcome, CacheStore, MemoryCache, OpenWeatherClient, Query, SqliteCache,
    WeatherError, WeatherLookup, REPORT_LINE_COUNT,
};

/// Show current weather conditions for a city
#[derive(Parser, Debug)]
#[command(name = "weatherly", version, about)]
struct Cli {
    /// City name (letters, spaces, and hyphens)
    city: String,

    /// Unit system for temperatures and wind speed
    #[arg(long, value_enum)]
    units: Option<UnitsArg>,

    /// Path to a config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for Units {
    fn from(arg: UnitsArg) -> Self {
        match arg {
            UnitsArg::Metric => Units::Metric,
            UnitsArg::Imperial => Units::Imperial,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let dotenv = dotenvy::dotenv();
    weatherly_core::init(cli.verbose);
    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) => tracing::debug!("No .env loaded: {}", e),
    }

    match run(cli).await {
        Ok(lines) => {
            print_report(&lines);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Vec<String>> {
    let config = Config::load_validated(cli.config.as_deref())?;
    let units = cli
        .units
        .map(Units::from)
        .unwrap_or(config.weather.default_units);

    tracing::info!("Looking up weather for {} ({})", cli.city.trim(), units);
    report_for(&config, Query::new(cli.city, units)).await
}

/// Look up `query` and render it. Nothing on disk is touched until the city
/// and the API key have been checked.
async fn report_for(config: &Config, query: Query) -> Result<Vec<String>> {
    check_request(&query, config.api_key.as_deref())?;

    let client = OpenWeatherClient::new(
        &config.weather.api_base_url,
        config.weather.request_timeout(),
    )?;
    let lookup = WeatherLookup::new(client, open_cache(config), config.api_key.clone())
        .with_ttl(config.cache.ttl());

    let outcome = lookup.lookup(&query).await?;
    Ok(format_outcome(&outcome))
}

/// Open the on-disk cache, degrading to a process-local one.
fn open_cache(config: &Config) -> Box<dyn CacheStore> {
    match SqliteCache::open(&config.cache.path) {
        Ok(cache) => {
            tracing::debug!("Using cache at {}", config.cache.path.display());
            Box::new(cache)
        }
        Err(e) => {
            tracing::warn!(
                "Cache at {} unavailable, using memory cache: {}",
                config.cache.path.display(),
                e
            );
            Box::new(MemoryCache::new())
        }
    }
}

/// Blank line, the report, blank line, then the cache notice if any.
fn print_report(lines: &[String]) {
    let split = lines.len().min(REPORT_LINE_COUNT);
    let (report, notice) = lines.split_at(split);

    println!();
    for line in report {
        println!("{}", line);
    }
    println!();
    for line in notice {
        println!("{}", line);
    }
}

fn error_line(err: &anyhow::Error) -> String {
    if let Some(e) = err.downcast_ref::<WeatherError>() {
        e.user_message()
    } else if let Some(e) = err.downcast_ref::<ConfigError>() {
        format!("Configuration error: {} ({})", e.user_message(), e)
    } else {
        format!("Unexpected error: {}", err)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_parse_city_only() {
        let cli = Cli::try_parse_from(["weatherly", "Paris"]).unwrap();
        assert_eq!(cli.city, "Paris");
        assert_eq!(cli.units, None);
        assert_eq!(cli.config, None);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "weatherly",
            "New York",
            "--units",
            "imperial",
            "--config",
            "/tmp/weatherly.toml",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.city, "New York");
        assert_eq!(cli.units.map(Units::from), Some(Units::Imperial));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/weatherly.toml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_city_is_required() {
        assert!(Cli::try_parse_from(["weatherly"]).is_err());
    }

    #[test]
    fn test_unknown_units_rejected() {
        assert!(Cli::try_parse_from(["weatherly", "Paris", "--units", "kelvin"]).is_err());
    }

    #[test]
    fn test_error_line_uses_weather_message() {
        let err = anyhow::Error::new(WeatherError::RateLimited);
        assert_eq!(
            error_line(&err),
            "Rate limit exceeded. Please try again later."
        );
    }

    #[test]
    fn test_error_line_for_config() {
        let err = anyhow::Error::new(ConfigError::Invalid(
            "weather.request_timeout_secs: must be greater than 0".into(),
        ));
        let line = error_line(&err);
        assert!(line.starts_with(
            "Configuration error: Invalid configuration. Check your settings."
        ));
        assert!(line.contains("request_timeout_secs"));
    }

    fn config_with_cache_at(path: &std::path::Path, api_key: Option<&str>) -> Config {
        let mut config = Config::default();
        config.cache.path = path.to_path_buf();
        config.weather.api_base_url = "http://127.0.0.1:9".to_string();
        config.api_key = api_key.map(str::to_string);
        config
    }

    #[tokio::test]
    async fn test_missing_key_leaves_cache_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("weatherly").join("cache.db");
        let config = config_with_cache_at(&db, None);

        let err = report_for(&config, Query::new("Paris", Units::Metric))
            .await
            .unwrap_err();

        assert_eq!(
            error_line(&err),
            "Error: OPENWEATHER_API_KEY environment variable is not set"
        );
        assert!(!db.exists());
        assert!(!dir.path().join("weatherly").exists());
    }

    #[tokio::test]
    async fn test_invalid_city_leaves_cache_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("cache.db");
        let config = config_with_cache_at(&db, Some("key"));

        let err = report_for(&config, Query::new("Paris1", Units::Metric))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WeatherError>(),
            Some(WeatherError::InvalidInput(_))
        ));
        assert!(!db.exists());
    }

    #[test]
    fn test_error_line_fallback() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(error_line(&err), "Unexpected error: boom");
    }
}

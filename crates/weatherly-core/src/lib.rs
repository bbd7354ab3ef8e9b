pub mod config;
pub mod error;

pub use config::{CacheConfig, Config, Units, ValidationResult, WeatherConfig};
pub use error::{ConfigError, NetworkError, ReqwestErrorExt};

use tracing_subscriber::EnvFilter;

/// Initialize logging.
///
/// `RUST_LOG` takes precedence; otherwise `verbosity` picks the level
/// (0 = warn, 1 = info, 2+ = debug). Output goes to stderr so stdout only
/// carries the report.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    tracing::debug!("Logging initialized at {}", default_level);
}

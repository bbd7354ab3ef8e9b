//! Shared error types for weatherly.
//!
//! Configuration and network failures are typed here so the lookup crate and
//! the CLI can classify them without string matching.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "Configuration file could not be read.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    /// HTTP status carried by the error, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        // The request URL carries the API key as a query parameter.
        let err = self.without_url();
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            NetworkError::ConnectionFailed(err.to_string())
        } else if let Some(status) = err.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() || err.is_body() {
            NetworkError::InvalidResponse(err.to_string())
        } else {
            NetworkError::ConnectionFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = [
            ConfigError::ParseError("bad".into()),
            ConfigError::Invalid("bad".into()),
            ConfigError::Read {
                path: "config.toml".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            },
        ];

        for err in &errors {
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn test_network_error_status() {
        let err = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(NetworkError::Timeout.status(), None);
    }

    #[test]
    fn test_read_error_display_includes_path() {
        let err = ConfigError::Read {
            path: "/tmp/weatherly.toml".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/weatherly.toml"));
    }
}

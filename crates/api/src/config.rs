//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREPULSE_TOKEN_SECRET` - Bearer-token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREPULSE_DATABASE_URL` - `SQLite` connection string (default: sqlite://storepulse.db)
//! - `STOREPULSE_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREPULSE_PORT` - Listen port (default: 3000)
//! - `STOREPULSE_TOKEN_TTL_SECS` - Token lifetime in seconds (default: 86400)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `SQLite` database connection URL
    pub database_url: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer-token signing secret
    pub token_secret: SecretString,
    /// Issued-token lifetime in seconds
    pub token_ttl_secs: i64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value
    /// cannot be parsed, or the token secret looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("STOREPULSE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://storepulse.db".to_owned());

        let host = std::env::var("STOREPULSE_HOST")
            .unwrap_or_else(|_| "127.0.0.1".to_owned())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREPULSE_HOST".to_owned(), e.to_string()))?;

        let port = std::env::var("STOREPULSE_PORT")
            .unwrap_or_else(|_| "3000".to_owned())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREPULSE_PORT".to_owned(), e.to_string()))?;

        let token_secret = std::env::var("STOREPULSE_TOKEN_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("STOREPULSE_TOKEN_SECRET".to_owned()))?;
        validate_token_secret(&token_secret)?;
        let token_secret = SecretString::from(token_secret);

        let token_ttl_secs = std::env::var("STOREPULSE_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "86400".to_owned())
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREPULSE_TOKEN_TTL_SECS".to_owned(), e.to_string())
            })?;
        if token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREPULSE_TOKEN_TTL_SECS".to_owned(),
                "must be positive".to_owned(),
            ));
        }

        let sentry_dsn = std::env::var("SENTRY_DSN").ok().filter(|s| !s.is_empty());

        Ok(Self {
            database_url,
            host,
            port,
            token_secret,
            token_ttl_secs,
            sentry_dsn,
        })
    }

    /// Socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Token signing secret bytes.
    #[must_use]
    pub fn token_secret_bytes(&self) -> &[u8] {
        self.token_secret.expose_secret().as_bytes()
    }
}

/// Reject token secrets that are too short or look like placeholders.
fn validate_token_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            "STOREPULSE_TOKEN_SECRET".to_owned(),
            format!("must be at least {MIN_TOKEN_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                "STOREPULSE_TOKEN_SECRET".to_owned(),
                format!("contains placeholder pattern '{pattern}'"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_token_secret_rejects_short() {
        assert!(matches!(
            validate_token_secret("short"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_validate_token_secret_rejects_placeholder() {
        assert!(matches!(
            validate_token_secret("changeme-changeme-changeme-changeme"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_validate_token_secret_accepts_strong() {
        assert!(validate_token_secret("k9PzWq3v8Tb1mXc5Rf7Jh2Ln4Ds6Gy0A").is_ok());
    }
}

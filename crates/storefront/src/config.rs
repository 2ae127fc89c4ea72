//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BAZAAR_API_URL` - Backend base URL (default: <http://localhost:8080>)
//! - `BAZAAR_ASSET_URL` - Static-asset origin for item images (default:
//!   same as `BAZAAR_API_URL`)
//! - `BAZAAR_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//!
//! The bearer token is not configuration: it is installed at the session
//! lifecycle boundary (`Session::login` / `Session::attach_token`) and
//! carried by the API client, never read from ambient storage per request.

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Bazaar REST backend
    pub base_url: Url,
    /// Origin against which relative `Item.image` paths are resolved
    pub asset_base_url: Url,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration pointing at `base_url` with defaults for
    /// everything else. Assets are served from the same origin.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            asset_base_url: base_url.clone(),
            base_url,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_url_env("BAZAAR_API_URL", DEFAULT_API_URL)?;
        let asset_base_url = match get_optional_env("BAZAAR_ASSET_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("BAZAAR_ASSET_URL".to_string(), e.to_string())
            })?,
            None => base_url.clone(),
        };
        let http_timeout_secs = get_env_or_default(
            "BAZAAR_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("BAZAAR_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            asset_base_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a URL from an environment variable, falling back to a default.
fn parse_url_env(key: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = get_env_or_default(key, default);
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let config = ClientConfig::new(Url::parse("http://localhost:9000").unwrap());
        assert_eq!(config.base_url.as_str(), "http://localhost:9000/");
        assert_eq!(config.asset_base_url, config.base_url);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_parse_url_env_default() {
        let url = parse_url_env("BAZAAR_TEST_UNSET_URL", DEFAULT_API_URL).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_get_env_or_default() {
        assert_eq!(get_env_or_default("BAZAAR_TEST_UNSET_VAR", "fallback"), "fallback");
    }
}

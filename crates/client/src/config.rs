//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SITEULATION_API` - Base URL of the remote API
//!   (default: `http://127.0.0.1:5000`)
//! - `SITEULATION_CACHE` - Path of the durable local cache record
//!   (default: `<platform data dir>/siteulation/cache.json`)
//! - `SITEULATION_TIMEOUT_SECS` - Remote request timeout (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default remote API base.
const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Default remote request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Cache record file name.
const CACHE_FILE_NAME: &str = "cache.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid api base url {0}: {1}")]
    InvalidBaseUrl(String, String),
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote API, without a trailing slash.
    pub api_base: String,
    /// Origin used to classify links as internal or external. The app is
    /// served from the API host, so the two coincide.
    pub origin: Url,
    /// Durable local cache record location.
    pub cache_path: PathBuf,
    /// Timeout applied to every remote request.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base = get_env_or_default("SITEULATION_API", DEFAULT_API_BASE);

        let cache_path =
            get_optional_env("SITEULATION_CACHE").map_or_else(default_cache_path, PathBuf::from);

        let timeout_secs = get_env_or_default(
            "SITEULATION_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SITEULATION_TIMEOUT_SECS".to_owned(), e.to_string())
        })?;

        let mut config = Self::new(&api_base, cache_path)?;
        config.request_timeout = Duration::from_secs(timeout_secs);
        Ok(config)
    }

    /// Build a configuration directly, for embedding and tests.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if `api_base` is not a valid
    /// URL.
    pub fn new(api_base: &str, cache_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let api_base = api_base.trim_end_matches('/').to_owned();
        let origin = Url::parse(&api_base)
            .map_err(|e| ConfigError::InvalidBaseUrl(api_base.clone(), e.to_string()))?;

        Ok(Self {
            api_base,
            origin,
            cache_path: cache_path.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
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

/// Default cache location under the platform-local data directory.
fn default_cache_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("siteulation")
        .join(CACHE_FILE_NAME)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = ClientConfig::new("https://api.siteulation.app/", "cache.json").unwrap();
        assert_eq!(config.api_base, "https://api.siteulation.app");
        assert_eq!(config.origin.host_str(), Some("api.siteulation.app"));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(matches!(
            ClientConfig::new("not a url", "cache.json"),
            Err(ConfigError::InvalidBaseUrl(_, _))
        ));
    }

    #[test]
    fn test_default_cache_path_has_file_name() {
        let path = default_cache_path();
        assert!(path.ends_with(format!("siteulation/{CACHE_FILE_NAME}")));
    }

    #[test]
    fn test_default_timeout() {
        let config = ClientConfig::new(DEFAULT_API_BASE, "cache.json").unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}

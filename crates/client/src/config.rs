//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TAVOLA_API_BASE_URL` - Base URL of the ordering backend (e.g.,
//!   `https://api.tavola.example`)
//!
//! ## Optional
//! - `TAVOLA_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `TAVOLA_DATA_DIR` - Override for the local data directory (cart and
//!   session files); defaults to the platform data dir

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the ordering backend API.
    pub base_url: Url,
    /// Timeout applied to every HTTP request.
    pub timeout: Duration,
    /// Override for the local data directory, if set.
    pub data_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_required_env("TAVOLA_API_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TAVOLA_API_BASE_URL".to_string(), e.to_string())
            })?;

        let timeout_secs = get_env_or_default("TAVOLA_REQUEST_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "TAVOLA_REQUEST_TIMEOUT_SECS".to_string(),
                    e.to_string(),
                )
            })?;

        let data_dir = get_optional_env("TAVOLA_DATA_DIR").map(PathBuf::from);

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            data_dir,
        })
    }

    /// Build a configuration directly, bypassing the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = base_url.parse::<Url>().map_err(|e| {
            ConfigError::InvalidEnvVar("base_url".to_string(), e.to_string())
        })?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(10),
            data_dir: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

//! Controller configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development. Every deadline has a
//! default so only the identity service URL is required.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default identity query deadline.
pub const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 3000;
/// Default OAuth start deadline.
pub const DEFAULT_OAUTH_TIMEOUT_MS: u64 = 5000;
/// Default logout deadline.
pub const DEFAULT_LOGOUT_TIMEOUT_MS: u64 = 2000;
/// Default pause before adopting an offline identity after a failed sign-in.
pub const DEFAULT_FALLBACK_DELAY_MS: u64 = 1000;

/// Controller configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the identity service
    pub api_base_url: String,
    /// OAuth provider name sent with the handshake request
    pub oauth_provider: String,
    /// File backing durable storage
    pub storage_path: PathBuf,
    /// Navigation target after sign-out
    pub app_root_url: String,
    pub resolve_timeout: Duration,
    pub oauth_timeout: Duration,
    pub logout_timeout: Duration,
    /// UX pacing before the offline fallback is adopted (not a retry)
    pub fallback_delay: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            oauth_provider: "google".to_string(),
            storage_path: PathBuf::from(".auth-session.json"),
            app_root_url: "/".to_string(),
            resolve_timeout: Duration::from_millis(DEFAULT_RESOLVE_TIMEOUT_MS),
            oauth_timeout: Duration::from_millis(DEFAULT_OAUTH_TIMEOUT_MS),
            logout_timeout: Duration::from_millis(DEFAULT_LOGOUT_TIMEOUT_MS),
            fallback_delay: Duration::from_millis(DEFAULT_FALLBACK_DELAY_MS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("AUTH_API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .map_err(|_| ConfigError::Missing("AUTH_API_BASE_URL"))?;
        if api_base_url.is_empty() {
            return Err(ConfigError::Invalid {
                name: "AUTH_API_BASE_URL",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            api_base_url,
            oauth_provider: env::var("AUTH_OAUTH_PROVIDER")
                .unwrap_or_else(|_| "google".to_string()),
            storage_path: env::var("AUTH_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".auth-session.json")),
            app_root_url: env::var("AUTH_APP_ROOT_URL").unwrap_or_else(|_| "/".to_string()),
            resolve_timeout: millis_from_env("AUTH_RESOLVE_TIMEOUT_MS", DEFAULT_RESOLVE_TIMEOUT_MS),
            oauth_timeout: millis_from_env("AUTH_OAUTH_TIMEOUT_MS", DEFAULT_OAUTH_TIMEOUT_MS),
            logout_timeout: millis_from_env("AUTH_LOGOUT_TIMEOUT_MS", DEFAULT_LOGOUT_TIMEOUT_MS),
            fallback_delay: millis_from_env("AUTH_FALLBACK_DELAY_MS", DEFAULT_FALLBACK_DELAY_MS),
        })
    }
}

fn millis_from_env(name: &str, default: u64) -> Duration {
    let millis = env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default);
    Duration::from_millis(millis)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

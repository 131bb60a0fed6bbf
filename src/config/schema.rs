//! Configuration schema for actfetch
//!
//! Configuration is stored at `~/.config/actfetch/config.toml`

use crate::fetch::{RetryPolicy, DEFAULT_HOST};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Remote fetch settings
    pub fetch: FetchConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory (default: `~/.cache/actfetch`)
    pub root: Option<PathBuf>,
}

/// Remote fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Host prefix for `org/repo` references
    pub default_host: String,

    /// Environment variable holding the bearer token
    pub token_env: String,

    /// History depth for unpinned fetches
    pub depth: u32,

    /// Per git command timeout in seconds (0 = none)
    pub timeout_secs: u64,

    /// Retry policy for transport failures
    pub retry: RetryConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_host: DEFAULT_HOST.to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            depth: 1,
            timeout_secs: 0,
            retry: RetryConfig::default(),
        }
    }
}

impl FetchConfig {
    /// Per-command timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Read the bearer token from the configured environment variable
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

/// Backoff settings for transport failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// First backoff interval in milliseconds
    pub initial_interval_ms: u64,

    /// Upper bound for a single backoff interval in milliseconds
    pub max_interval_ms: u64,

    /// Stop retrying once this much time has passed, in milliseconds
    pub max_elapsed_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_interval_ms: policy.initial_interval.as_millis() as u64,
            max_interval_ms: policy.max_interval.as_millis() as u64,
            max_elapsed_ms: policy.max_elapsed.as_millis() as u64,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_interval: Duration::from_millis(config.initial_interval_ms),
            max_interval: Duration::from_millis(config.max_interval_ms),
            max_elapsed: Duration::from_millis(config.max_elapsed_ms),
        }
    }
}

//! Configuration Module
//!
//! Handles loading the process cache and server configuration from environment
//! variables, and the edge tier's deployment settings.

use std::env;
use std::time::Duration;

/// Server and process cache configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the process cache can hold
    pub max_entries: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            sweep_interval_secs: env_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval_secs),
        }
    }

    /// Default TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    /// Sweep interval as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl_ms: 5 * 60 * 1000,
            server_port: 3000,
            sweep_interval_secs: 5 * 60,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// == Edge Config ==
/// Deployment settings for the edge interception cache.
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    /// Deployment generation tag, embedded in every store name
    pub version: String,
    /// Origin that relative manifest URLs are resolved against
    pub origin: String,
    /// Maximum age of a stored response before cleanup deletes it
    pub max_age: Duration,
    /// URLs that must be present in the static store after install
    pub static_manifest: Vec<String>,
    /// API endpoints opportunistically warmed into the API store on install
    pub api_manifest: Vec<String>,
}

impl EdgeConfig {
    /// Loads the edge settings from environment variables.
    ///
    /// # Environment Variables
    /// - `EDGE_VERSION` - Deployment generation tag (default: v1)
    /// - `EDGE_ORIGIN` - Origin for manifest URLs (default: http://localhost:3000)
    /// - `EDGE_MAX_AGE_SECS` - Cleanup age limit (default: 7 days)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            version: env_or("EDGE_VERSION", defaults.version),
            origin: env_or("EDGE_ORIGIN", defaults.origin),
            max_age: Duration::from_secs(env_or("EDGE_MAX_AGE_SECS", defaults.max_age.as_secs())),
            ..defaults
        }
    }

    /// Creates a config for the given deployment version with default manifests.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            origin: "http://localhost:3000".to_string(),
            max_age: Duration::from_secs(7 * 24 * 60 * 60),
            static_manifest: vec![
                "/".to_string(),
                "/offline".to_string(),
                "/manifest.json".to_string(),
                "/favicon.ico".to_string(),
            ],
            api_manifest: vec![
                "/api/announcements".to_string(),
                "/api/articles".to_string(),
                "/api/stats".to_string(),
            ],
        }
    }
}

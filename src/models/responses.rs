//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::edge::{CleanupReport, LifecycleState};

/// Response body for the DELETE operation (DELETE /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for pattern invalidation (POST /cache/invalidate)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub pattern: String,
    /// Number of entries removed
    pub removed: usize,
}

/// Response body for the stats endpoint (GET /cache/stats)
///
/// Field names follow [`CacheStats`] (`maxSize`, `hitRate`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of TTL expirations
    pub expirations: u64,
    /// Current number of entries in cache
    pub size: usize,
    /// Capacity bound
    pub max_size: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            size: stats.size,
            max_size: stats.max_size,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for POST /edge/activate
#[derive(Debug, Clone, Serialize)]
pub struct ActivateResponse {
    /// Stores purged from previous deployment generations
    pub deleted: Vec<String>,
}

/// Response body for POST /edge/cleanup
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    /// True when another cleanup was already running
    pub skipped: bool,
    pub report: Option<CleanupReport>,
}

impl From<Option<CleanupReport>> for CleanupResponse {
    fn from(report: Option<CleanupReport>) -> Self {
        Self {
            skipped: report.is_none(),
            report,
        }
    }
}

/// Response body for GET /edge/status
#[derive(Debug, Clone, Serialize)]
pub struct EdgeStatusResponse {
    pub state: LifecycleState,
    /// Generation name of this deployment
    pub generation: String,
    /// Every store currently present
    pub stores: Vec<String>,
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

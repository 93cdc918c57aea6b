//! Error types for the caching tiers
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for cache bookkeeping and the edge tier.
///
/// Producer failures inside [`crate::cache::Memoized`] are never wrapped in
/// this type; they reach the caller unchanged.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data (empty or oversized key, bad pattern)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A response body could not be buffered for storage
    #[error("Body error: {0}")]
    Body(String),

    /// Network fetch failed and no stored fallback was available
    #[error("Network error: {0}")]
    Network(String),

    /// Named store backend failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Network(_) => StatusCode::BAD_GATEWAY,
            CacheError::Body(_) | CacheError::Storage(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Network(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching tiers.
pub type Result<T> = std::result::Result<T, CacheError>;

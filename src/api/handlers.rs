//! API Handlers
//!
//! HTTP request handlers for the admin endpoints and the demonstration route.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::info;

use crate::cache::ProcessCache;
use crate::config::{Config, EdgeConfig};
use crate::edge::{EdgeCache, HttpNetwork, InstallReport};
use crate::error::{CacheError, Result};
use crate::models::{
    ActivateResponse, CleanupResponse, DeleteResponse, EdgeStatusResponse, HealthResponse,
    InvalidateRequest, InvalidateResponse, StatsResponse,
};
use crate::response::CachedResponse;

/// Application state shared across all handlers.
///
/// Both tiers are constructed once here and injected into every route.
#[derive(Clone)]
pub struct AppState {
    /// Process cache backing every wrapped route
    pub cache: ProcessCache<CachedResponse>,
    /// Edge interception cache driven through the /edge endpoints
    pub edge: Arc<EdgeCache>,
}

impl AppState {
    /// Creates a new AppState from already built tiers.
    pub fn new(cache: ProcessCache<CachedResponse>, edge: Arc<EdgeCache>) -> Self {
        Self { cache, edge }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The edge tier uses in-memory stores and a real HTTP client.
    pub fn from_config(config: &Config, edge_config: EdgeConfig) -> Self {
        let cache = ProcessCache::from_config(config);
        let edge = EdgeCache::in_memory(edge_config, Arc::new(HttpNetwork::default()));
        Self::new(cache, Arc::new(edge))
    }
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key).await {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = state.cache.invalidate_by_pattern(&req.pattern).await;
    info!(pattern = %req.pattern, removed, "invalidated by pattern");

    Ok(Json(InvalidateResponse {
        pattern: req.pattern,
        removed,
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for POST /edge/install
pub async fn edge_install_handler(State(state): State<AppState>) -> Json<InstallReport> {
    Json(state.edge.install().await)
}

/// Handler for POST /edge/activate
pub async fn edge_activate_handler(
    State(state): State<AppState>,
) -> Result<Json<ActivateResponse>> {
    let deleted = state.edge.activate().await?;
    Ok(Json(ActivateResponse { deleted }))
}

/// Handler for POST /edge/cleanup
pub async fn edge_cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    Json(state.edge.cleanup().await.into())
}

/// Handler for GET /edge/status
pub async fn edge_status_handler(
    State(state): State<AppState>,
) -> Result<Json<EdgeStatusResponse>> {
    let stores = state.edge.storage().store_names().await?;

    Ok(Json(EdgeStatusResponse {
        state: state.edge.state().await,
        generation: state.edge.names().umbrella.clone(),
        stores,
    }))
}

/// Handler for GET /demo/time
///
/// Served through the response cache; the timestamp only changes once the
/// cached copy expires.
pub async fn demo_time_handler(request: Request) -> Response {
    Json(json!({
        "path": request.uri().path(),
        "generatedAt": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}

//! API Routes
//!
//! Configures the Axum router with the admin endpoints and the cached
//! demonstration route.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, demo_time_handler, edge_activate_handler, edge_cleanup_handler,
    edge_install_handler, edge_status_handler, health_handler, invalidate_handler, stats_handler,
    AppState,
};
use crate::response::{wrap_handler, CachePreset};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /cache/stats` - Process cache statistics
/// - `DELETE /cache/:key` - Delete one process cache entry
/// - `POST /cache/invalidate` - Delete every entry whose key contains a pattern
/// - `POST /edge/install` - Warm the edge stores from the manifests
/// - `POST /edge/activate` - Purge stores from previous generations
/// - `POST /edge/cleanup` - Age-based sweep of the edge stores
/// - `GET /edge/status` - Edge lifecycle state and stores
/// - `GET /demo/time` - Demonstration route behind the response cache
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let demo_time = wrap_handler(demo_time_handler, CachePreset::Realtime, state.cache.clone());

    Router::new()
        .route("/cache/stats", get(stats_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/cache/:key", delete(delete_handler))
        .route("/edge/install", post(edge_install_handler))
        .route("/edge/activate", post(edge_activate_handler))
        .route("/edge/cleanup", post(edge_cleanup_handler))
        .route("/edge/status", get(edge_status_handler))
        .route("/demo/time", get(demo_time))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

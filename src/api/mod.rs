//! API Module
//!
//! Admin HTTP surface over both caching tiers, plus one demonstration route
//! served through the response cache.
//!
//! # Endpoints
//! - `GET /cache/stats`, `DELETE /cache/:key`, `POST /cache/invalidate`
//! - `POST /edge/install`, `POST /edge/activate`, `POST /edge/cleanup`, `GET /edge/status`
//! - `GET /demo/time`
//! - `GET /health`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

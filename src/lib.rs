//! Tiered Cache - multi-tier caching for HTTP services
//!
//! - [`cache`]: in-process read-through cache with TTL expiration, LRU
//!   eviction and statistics
//! - [`response`]: cache-aware handler wrapper emitting HTTP caching headers
//!   and answering conditional GETs
//! - [`edge`]: edge interception cache with cache-first, network-first and
//!   stale-while-revalidate strategies over named stores

pub mod api;
pub mod cache;
pub mod config;
pub mod edge;
pub mod error;
pub mod http_date;
pub mod models;
pub mod response;
pub mod tasks;

pub use api::AppState;
pub use cache::ProcessCache;
pub use config::{Config, EdgeConfig};
pub use edge::EdgeCache;
pub use error::{CacheError, Result};
pub use response::{wrap_handler, CacheOptions, CachePreset};
pub use tasks::spawn_sweep_task;

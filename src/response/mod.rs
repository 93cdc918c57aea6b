//! Cache-Aware Handler Wrapper
//!
//! Composes the process cache with HTTP caching semantics: whole GET
//! responses are memoized, every cacheable response carries fresh
//! `Cache-Control`/`ETag`/`Vary` headers, and conditional GETs can be
//! answered with `304 Not Modified`.

mod conditional;
mod headers;
mod options;
mod wrapper;

pub use conditional::handle_conditional_get;
pub use headers::{apply_cache_headers, cache_control_value, create_cache_headers, generate_etag, X_CACHE};
pub use options::{CacheOptions, CachePreset};
pub use wrapper::{cache_key, wrap_handler, CachedResponse, ResponseCache, MAX_CACHEABLE_BODY};

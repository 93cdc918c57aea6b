//! Process Cache Module
//!
//! In-memory read-through caching with TTL expiration, LRU eviction and
//! hit/miss statistics.

mod entry;
mod lru;
mod memoize;
mod process;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, duration_ms, CacheEntry};
pub use lru::LruTracker;
pub use memoize::Memoized;
pub use process::ProcessCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 2048;

//! Process Cache Module
//!
//! Shared, cloneable handle over a [`CacheStore`]. Constructed once by the
//! host's composition root and handed to every consumer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore, Memoized};
use crate::config::Config;
use crate::error::Result;

// == Process Cache ==
/// Thread-safe process cache.
///
/// All operations take the store lock for the duration of a single
/// in-memory operation only; no I/O ever happens under the lock.
#[derive(Debug)]
pub struct ProcessCache<V> {
    store: Arc<RwLock<CacheStore<V>>>,
}

impl<V> Clone for ProcessCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<V: Clone> ProcessCache<V> {
    /// Creates a cache bounded at `max_entries` with the given default TTL.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self::from_store(CacheStore::new(max_entries, default_ttl))
    }

    /// Creates a cache from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_entries, config.default_ttl())
    }

    pub fn from_store(store: CacheStore<V>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Returns the live value for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<V> {
        // Write lock: a hit mutates LRU order and counters
        self.store.write().await.get(key)
    }

    /// Stores `value` under `key`; `None` uses the default TTL.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> Result<()> {
        self.store.write().await.set(key.into(), value, ttl)
    }

    /// Removes one entry; returns whether it existed.
    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    /// Removes every entry whose key contains `pattern`.
    pub async fn invalidate_by_pattern(&self, pattern: &str) -> usize {
        self.store.write().await.invalidate_by_pattern(pattern)
    }

    /// Removes every expired entry.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Whether `key` is physically present, expired or not.
    pub async fn contains(&self, key: &str) -> bool {
        self.store.read().await.contains(key)
    }

    // == Wrap ==
    /// Read-through memoization of `producer`.
    ///
    /// The returned [`Memoized`] derives a key with `key_fn`, answers hits
    /// from this cache and stores only successful producer results.
    pub fn wrap<A, Fut, E, F, K>(&self, producer: F, key_fn: K, ttl: Option<Duration>) -> Memoized<V, F, K>
    where
        F: Fn(A) -> Fut,
        K: Fn(&A) -> String,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        Memoized::new(self.clone(), producer, key_fn, ttl)
    }
}

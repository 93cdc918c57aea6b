//! Read-Through Memoization
//!
//! [`Memoized`] wraps an async producer so repeated calls with the same
//! derived key are answered from a [`ProcessCache`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::cache::ProcessCache;

// == Memoized ==
/// A producer wrapped with read-through caching.
///
/// - hit: the cached value is returned and the producer is not invoked
/// - miss: the producer runs; only an `Ok` result is stored
/// - an `Err` from the producer is returned unchanged and never cached
///
/// Concurrent misses on one key are coalesced by default: the first caller
/// runs the producer while the others wait and then read the stored value.
/// The producer runs on its own task, so dropping a pending call does not
/// cancel the producer or the store that follows it.
pub struct Memoized<V, F, K> {
    cache: ProcessCache<V>,
    producer: Arc<F>,
    key_fn: Arc<K>,
    ttl: Option<Duration>,
    in_flight: Option<Arc<InFlight>>,
}

impl<V, F, K> Clone for Memoized<V, F, K> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            producer: Arc::clone(&self.producer),
            key_fn: Arc::clone(&self.key_fn),
            ttl: self.ttl,
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<V, F, K> Memoized<V, F, K> {
    pub(crate) fn new(cache: ProcessCache<V>, producer: F, key_fn: K, ttl: Option<Duration>) -> Self {
        Self {
            cache,
            producer: Arc::new(producer),
            key_fn: Arc::new(key_fn),
            ttl,
            in_flight: Some(Arc::new(InFlight::default())),
        }
    }

    /// Lets every concurrent miss invoke the producer independently; the
    /// last store wins.
    pub fn without_coalescing(mut self) -> Self {
        self.in_flight = None;
        self
    }

    /// The cache backing this wrapper.
    pub fn cache(&self) -> &ProcessCache<V> {
        &self.cache
    }

    /// The key a call with `args` would use.
    pub fn key_for<A>(&self, args: &A) -> String
    where
        K: Fn(&A) -> String,
    {
        (self.key_fn)(args)
    }

    // == Call ==
    /// Invokes the wrapped producer through the cache.
    ///
    /// # Panics
    /// Re-raises a panic from the producer. Also panics if the runtime shuts
    /// down while the producer task is still running, since no result exists
    /// to return.
    pub async fn call<A, Fut, E>(&self, args: A) -> Result<V, E>
    where
        V: Clone + Send + Sync + 'static,
        F: Fn(A) -> Fut,
        K: Fn(&A) -> String,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Send + 'static,
    {
        let key = (self.key_fn)(&args);

        let permit = match &self.in_flight {
            Some(registry) => Some(InFlight::acquire(registry, &key).await),
            None => None,
        };

        if let Some(value) = self.cache.get(&key).await {
            return Ok(value);
        }

        debug!(key = %key, "cache miss, invoking producer");
        let pending = (self.producer)(args);
        let cache = self.cache.clone();
        let ttl = self.ttl;

        let task = tokio::spawn(async move {
            let result = pending.await;
            if let Ok(value) = &result {
                if let Err(err) = cache.set(key.clone(), value.clone(), ttl).await {
                    warn!(key = %key, error = %err, "failed to store producer result");
                }
            }
            drop(permit);
            result
        });

        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => panic!("producer task cancelled by runtime shutdown: {err}"),
        }
    }
}

// == In-Flight Registry ==
/// Per-key async locks held for the duration of a miss.
#[derive(Default)]
struct InFlight {
    locks: Mutex<HashMap<String, Slot>>,
}

/// One key's lock and the number of callers holding or waiting on it.
#[derive(Default)]
struct Slot {
    lock: Arc<AsyncMutex<()>>,
    holders: usize,
}

impl InFlight {
    async fn acquire(registry: &Arc<InFlight>, key: &str) -> InFlightPermit {
        let lock = {
            let mut locks = registry.locks.lock().unwrap_or_else(|e| e.into_inner());
            let slot = locks.entry(key.to_string()).or_default();
            slot.holders += 1;
            Arc::clone(&slot.lock)
        };

        // Registered before waiting, so a caller dropped mid-wait still leaves
        let mut permit = InFlightPermit {
            registry: Arc::clone(registry),
            key: key.to_string(),
            guard: None,
        };
        permit.guard = Some(lock.lock_owned().await);
        permit
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }
}

struct InFlightPermit {
    registry: Arc<InFlight>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        self.guard.take();

        let mut locks = self.registry.locks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = locks.get_mut(&self.key) {
            slot.holders -= 1;
            if slot.holders == 0 {
                locks.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct FetchError(String);

    fn cache() -> ProcessCache<String> {
        ProcessCache::new(100, Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_hit_skips_producer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let fetch = cache().wrap(
            move |id: u32| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, FetchError>(format!("article-{id}")) }
            },
            |id: &u32| format!("articles:{id}"),
            None,
        );

        assert_eq!(fetch.call(1).await.unwrap(), "article-1");
        assert_eq!(fetch.call(1).await.unwrap(), "article-1");
        assert_eq!(fetch.call(2).await.unwrap(), "article-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let stats = fetch.cache().stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[tokio::test]
    async fn test_failures_are_never_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        // Fails on the first three calls, succeeds on the fourth
        let fetch = cache().wrap(
            move |_: ()| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 4 {
                        Err(FetchError(format!("attempt {n}")))
                    } else {
                        Ok("fresh".to_string())
                    }
                }
            },
            |_: &()| "stats".to_string(),
            None,
        );

        for n in 1..4 {
            let err = fetch.call(()).await.unwrap_err();
            assert_eq!(err, FetchError(format!("attempt {n}")));
            assert!(!fetch.cache().contains("stats").await);
        }
        assert_eq!(fetch.call(()).await.unwrap(), "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        assert_eq!(fetch.call(()).await.unwrap(), "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_ttl_is_applied_to_stored_results() {
        let fetch = cache().wrap(
            |_: ()| async { Ok::<_, FetchError>("v".to_string()) },
            |_: &()| "short".to_string(),
            Some(Duration::from_millis(50)),
        );

        fetch.call(()).await.unwrap();
        assert!(fetch.cache().contains("short").await);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(fetch.cache().get("short").await, None);
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_coalesced() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let fetch = cache().wrap(
            move |_: ()| {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, FetchError>("slow".to_string())
                }
            },
            |_: &()| "hot".to_string(),
            None,
        );

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let fetch = fetch.clone();
                tokio::spawn(async move { fetch.call(()).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "slow");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_without_coalescing_still_returns_values() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let fetch = cache()
            .wrap(
                move |_: ()| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, FetchError>("v".to_string())
                    }
                },
                |_: &()| "herd".to_string(),
                None,
            )
            .without_coalescing();

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let fetch = fetch.clone();
                tokio::spawn(async move { fetch.call(()).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "v");
        }
        let n = calls.load(Ordering::SeqCst);
        assert!((1..=5).contains(&n));
        assert_eq!(fetch.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_abandoned_call_still_stores_result() {
        let fetch = cache().wrap(
            |_: ()| async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, FetchError>("late".to_string())
            },
            |_: &()| "abandoned".to_string(),
            None,
        );

        let outcome = tokio::time::timeout(Duration::from_millis(10), fetch.call(())).await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(fetch.cache().contains("abandoned").await);
    }

    #[tokio::test]
    async fn test_store_failure_still_returns_value() {
        let fetch = cache().wrap(
            |_: ()| async { Ok::<_, FetchError>("value".to_string()) },
            |_: &()| String::new(),
            None,
        );

        assert_eq!(fetch.call(()).await.unwrap(), "value");
        assert!(fetch.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_in_flight_registry_is_drained() {
        let fetch = cache().wrap(
            |n: u32| async move { Ok::<_, FetchError>(n.to_string()) },
            |n: &u32| format!("n:{n}"),
            None,
        );

        for n in 0..5 {
            fetch.call(n).await.unwrap();
        }

        let registry = fetch.in_flight.as_ref().unwrap();
        assert!(registry.is_empty());
        assert_eq!(fetch.key_for(&3), "n:3");
    }

    #[tokio::test]
    async fn test_cancelled_waiter_leaves_registry() {
        let registry = Arc::new(InFlight::default());
        let leader = InFlight::acquire(&registry, "k").await;

        let waiter = tokio::spawn({
            let registry = Arc::clone(&registry);
            async move {
                let _permit = InFlight::acquire(&registry, "k").await;
            }
        });
        // Let the waiter register and block on the lock
        tokio::task::yield_now().await;

        // Wake the waiter, then cancel it before it runs again
        drop(leader);
        waiter.abort();
        let _ = waiter.await;

        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_waiter_keeps_leader_slot() {
        let registry = Arc::new(InFlight::default());
        let leader = InFlight::acquire(&registry, "k").await;

        let waiter = tokio::spawn({
            let registry = Arc::clone(&registry);
            async move {
                let _permit = InFlight::acquire(&registry, "k").await;
            }
        });
        tokio::task::yield_now().await;
        waiter.abort();
        let _ = waiter.await;

        assert!(!registry.is_empty());
        drop(leader);
        assert!(registry.is_empty());
    }
}

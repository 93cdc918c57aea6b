//! Property-Based Tests for the Process Cache
//!
//! Uses proptest to check the store's invariants over arbitrary operation
//! sequences.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

use crate::cache::{CacheStore, ProcessCache};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates cache keys drawn from a few namespaces so patterns overlap
fn key_strategy() -> impl Strategy<Value = String> {
    ("(api|page|articles|stats)", "[a-z0-9]{1,8}").prop_map(|(ns, id)| format!("{ns}:{id}"))
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32 },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn unique(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hits and misses count exactly the reads that found / did not find a value.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key, value, None).unwrap();
                }
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.size, store.len());
    }

    // The size bound holds after every set.
    #[test]
    fn prop_capacity_bound(
        entries in prop::collection::vec((key_strategy(), any::<u32>()), 1..200),
        max_entries in 1usize..20,
    ) {
        let mut store = CacheStore::new(max_entries, TEST_DEFAULT_TTL);

        for (key, value) in entries {
            store.set(key, value, None).unwrap();
            prop_assert!(store.len() <= max_entries);
        }
    }

    // A second set for the same key replaces the value without growing the store.
    #[test]
    fn prop_overwrite(key in key_strategy(), v1 in any::<u32>(), v2 in any::<u32>()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);

        store.set(key.clone(), v1, None).unwrap();
        let size = store.len();
        store.set(key.clone(), v2, None).unwrap();

        prop_assert_eq!(store.len(), size);
        prop_assert_eq!(store.get(&key), Some(v2));
    }

    // Pattern invalidation removes exactly the keys containing the pattern.
    #[test]
    fn prop_pattern_invalidation(
        keys in prop::collection::vec(key_strategy(), 1..50),
        pattern in "(api|page|articles|stats|:1|x)",
    ) {
        let keys = unique(keys);
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);
        for key in &keys {
            store.set(key.clone(), 0u32, None).unwrap();
        }

        let expected = keys.iter().filter(|k| k.contains(pattern.as_str())).count();
        let removed = store.invalidate_by_pattern(&pattern);

        prop_assert_eq!(removed, expected);
        for key in &keys {
            prop_assert_eq!(store.contains(key), !key.contains(pattern.as_str()));
        }
    }

    // At capacity, the entry read or written least recently is the one evicted.
    #[test]
    fn prop_lru_eviction_choice(
        keys in prop::collection::vec(key_strategy(), 3..10),
        touched in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let keys = unique(keys);
        prop_assume!(keys.len() >= 2);

        let mut store = CacheStore::new(keys.len(), TEST_DEFAULT_TTL);
        let mut order: Vec<String> = Vec::new();
        for key in &keys {
            store.set(key.clone(), 0u32, None).unwrap();
            order.push(key.clone());
        }
        for index in touched {
            let key = index.get(&keys).clone();
            store.get(&key);
            order.retain(|k| k != &key);
            order.push(key);
        }

        store.set("fresh:key".to_string(), 1, None).unwrap();

        prop_assert!(!store.contains(&order[0]));
        for key in &order[1..] {
            prop_assert!(store.contains(key));
        }
    }

    // Re-reading a fixed key set never lowers the hit ratio.
    #[test]
    fn prop_hit_ratio_monotonic(keys in prop::collection::vec(key_strategy(), 1..20), rounds in 1usize..5) {
        let keys = unique(keys);
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_DEFAULT_TTL);
        for key in &keys {
            store.get(key);
            store.set(key.clone(), 0u32, None).unwrap();
        }

        let mut last = store.stats().hit_rate();
        for _ in 0..rounds {
            for key in &keys {
                store.get(key);
                let rate = store.stats().hit_rate();
                prop_assert!(rate >= last);
                last = rate;
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(25))]

    // Concurrent mutation through the shared handle never breaks the size bound.
    #[test]
    fn prop_concurrent_operations_respect_bound(
        ops in prop::collection::vec(cache_op_strategy(), 10..80),
    ) {
        let max_entries = 8;
        let size = tokio_test::block_on(async move {
            let cache: ProcessCache<u32> = ProcessCache::new(max_entries, TEST_DEFAULT_TTL);
            let handles: Vec<_> = ops
                .into_iter()
                .map(|op| {
                    let cache = cache.clone();
                    tokio::spawn(async move {
                        match op {
                            CacheOp::Set { key, value } => {
                                cache.set(key, value, None).await.unwrap();
                            }
                            CacheOp::Get { key } => {
                                cache.get(&key).await;
                            }
                            CacheOp::Delete { key } => {
                                cache.delete(&key).await;
                            }
                        }
                        cache.len().await
                    })
                })
                .collect();

            let mut max_seen = 0;
            for handle in handles {
                max_seen = max_seen.max(handle.await.unwrap());
            }
            max_seen
        });

        prop_assert!(size <= max_entries);
    }
}

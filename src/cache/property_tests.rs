//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a naive reference model and to
//! exercise the async cache handle.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::cache::{Store, TtlCache};

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(10);

// == Strategies ==
/// Generates keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = u32> {
    any::<u32>()
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: u32 },
    Get { key: String },
    Remove { key: String },
    /// Moves the test clock forward by this many seconds
    Advance { secs: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => (1u64..15).prop_map(|secs| CacheOp::Advance { secs }),
    ]
}

// == Reference Model ==
/// Linear-scan LRU used as the oracle. Front of the Vec is most recent.
#[derive(Debug, Default)]
struct ModelCache {
    entries: Vec<(String, u32, Instant)>,
    capacity: usize,
}

impl ModelCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _, _)| k == key)
    }

    fn get(&mut self, key: &str, now: Instant) -> Option<u32> {
        let pos = self.position(key)?;
        let (k, v, last) = self.entries.remove(pos);
        if now.saturating_duration_since(last) >= TEST_TTL {
            return None;
        }
        self.entries.insert(0, (k, v, now));
        Some(v)
    }

    fn put(&mut self, key: String, value: u32, now: Instant) {
        if let Some(pos) = self.position(&key) {
            self.entries.remove(pos);
        } else if self.entries.len() == self.capacity {
            self.entries.pop();
        }
        self.entries.insert(0, (key, value, now));
    }

    fn remove(&mut self, key: &str) -> Option<u32> {
        let pos = self.position(key)?;
        Some(self.entries.remove(pos).1)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _, _)| k.clone()).collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // **Property 1: Reference Model Agreement**
    // *For any* sequence of operations, the store SHALL return the same
    // results and hold the same keys in the same recency order as a
    // linear-scan LRU with the same capacity and TTL.
    #[test]
    fn prop_matches_reference_model(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut store = Store::new(capacity, TEST_TTL).unwrap();
        let mut model = ModelCache::new(capacity);
        let mut now = Instant::now();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    store.put(key.clone(), value, now);
                    model.put(key, value, now);
                }
                CacheOp::Get { key } => {
                    let got = store.get(key.as_str(), now).copied();
                    prop_assert_eq!(got, model.get(&key, now), "get({}) mismatch", key);
                }
                CacheOp::Remove { key } => {
                    prop_assert_eq!(store.remove(key.as_str()), model.remove(&key));
                }
                CacheOp::Advance { secs } => {
                    now += Duration::from_secs(secs);
                }
            }
            store.assert_consistent();
            prop_assert_eq!(store.keys(), model.keys());
        }
    }

    // **Property 2: Capacity Enforcement**
    // *For any* sequence of PUT operations, the number of entries SHALL never
    // exceed the capacity, and each new key at capacity SHALL evict exactly
    // the least recently used key.
    #[test]
    fn prop_capacity_enforcement(
        capacity in 1usize..20,
        keys in prop::collection::vec(key_strategy(), 1..200)
    ) {
        let mut store = Store::new(capacity, TEST_TTL).unwrap();
        let now = Instant::now();

        for key in keys {
            let was_present = store.contains_key(key.as_str(), now);
            let lru_key = store.keys().last().cloned();
            let was_full = store.len() == capacity;

            let evicted = store.put(key, 0u32, now);

            prop_assert!(store.len() <= capacity);
            if was_full && !was_present {
                prop_assert_eq!(evicted.map(|entry| entry.key), lru_key);
            } else {
                prop_assert!(evicted.is_none());
            }
        }
    }

    // **Property 3: Overwrite Semantics**
    // *For any* key, storing V1 and then V2 SHALL leave exactly one entry for
    // the key and GET SHALL return V2.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = Store::new(4, TEST_TTL).unwrap();
        let now = Instant::now();

        store.put(key.clone(), value1, now);
        store.put(key.clone(), value2, now);

        prop_assert_eq!(store.get(key.as_str(), now).copied(), Some(value2));
        prop_assert_eq!(store.len(), 1);
    }

    // **Property 4: Idempotent Miss**
    // *For any* key that is absent or expired, repeated GETs SHALL miss and
    // SHALL NOT create an entry.
    #[test]
    fn prop_idempotent_miss(
        stored in prop::collection::hash_set(key_strategy(), 0..6),
        missing_key in key_strategy(),
        repeats in 1usize..5
    ) {
        let mut store = Store::new(10, TEST_TTL).unwrap();
        let start = Instant::now();
        for key in &stored {
            store.put(key.clone(), 1u32, start);
        }
        let later = start + TEST_TTL;

        for _ in 0..repeats {
            prop_assert!(store.get(missing_key.as_str(), later).is_none());
        }
        let remaining: HashSet<String> = store.keys().into_iter().collect();
        prop_assert!(!remaining.contains(&missing_key));
        prop_assert!(remaining.is_subset(&stored));
    }

    // **Property 5: Sweep Agreement**
    // *For any* set of entries and snapshot, a sweep SHALL remove exactly the
    // entries a GET at that snapshot would report as expired.
    #[test]
    fn prop_sweep_matches_read_expiry(
        ages in prop::collection::vec(0u64..20, 1..12)
    ) {
        let origin = Instant::now();
        let snapshot = origin + Duration::from_secs(20);
        let mut swept = Store::new(ages.len(), TEST_TTL).unwrap();
        let mut read = Store::new(ages.len(), TEST_TTL).unwrap();

        for (i, age) in ages.iter().enumerate() {
            let touched = snapshot - Duration::from_secs(*age);
            swept.put(i, *age, touched);
            read.put(i, *age, touched);
        }

        let report = swept.sweep_expired(snapshot, || true);
        swept.assert_consistent();

        let survivors: Vec<usize> = (0..ages.len())
            .filter(|i| read.get(i, snapshot).is_some())
            .collect();
        let mut kept = swept.keys();
        kept.sort_unstable();

        prop_assert!(report.completed);
        prop_assert_eq!(report.removed, ages.len() - survivors.len());
        prop_assert_eq!(kept, survivors);
    }
}

// Separate proptest block with fewer cases for the async handle
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // **Property 6: Recency Refresh Through the Cache Handle**
    // *For any* filled cache, a GET or PUT on a key SHALL make it the last
    // key to be evicted among the live keys.
    #[test]
    fn prop_touch_protects_from_eviction(
        keys in prop::collection::hash_set(key_strategy(), 2..8),
        touch_index in 0usize..8,
        touch_with_put in any::<bool>()
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let touched = keys[touch_index % keys.len()].clone();

        tokio_test::block_on(async {
            let cache = TtlCache::new(keys.len(), TEST_TTL, Duration::from_secs(60)).unwrap();
            for key in &keys {
                cache.put(key.clone(), 0u32).await;
            }

            if touch_with_put {
                cache.put(touched.clone(), 1).await;
            } else {
                assert!(cache.get(touched.as_str()).await.is_some());
            }

            // Push out every other key
            for i in 0..keys.len() - 1 {
                cache.put(format!("fresh{i}"), 2).await;
            }

            assert!(cache.contains_key(touched.as_str()).await);
            for key in keys.iter().filter(|key| **key != touched) {
                assert!(!cache.contains_key(key.as_str()).await);
            }
            cache.assert_consistent().await;
        });
    }
}

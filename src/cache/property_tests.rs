//! Property-Based Tests for Cache Module
//!
//! Drives the store with random operation sequences and checks it against a
//! plain reference model after every step.

use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::CacheStore;
use crate::config::CacheConfig;

// == Test Configuration ==
const TEST_CAPACITY: usize = 8;

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]".prop_map(|s| s)
}

fn ttl_strategy() -> impl Strategy<Value = Option<u64>> {
    prop_oneof![Just(None), Just(Some(0)), (1u64..5).prop_map(Some)]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32, ttl: Option<u64> },
    Get { key: String },
    Delete { key: String },
    Advance { secs: u64 },
    Sweep,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), any::<u32>(), ttl_strategy())
            .prop_map(|(key, value, ttl)| CacheOp::Set { key, value, ttl }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => (0u64..3).prop_map(|secs| CacheOp::Advance { secs }),
        1 => Just(CacheOp::Sweep),
    ]
}

// == Reference Model ==
/// Straightforward O(n) cache with the same semantics as the store.
#[derive(Default)]
struct Model {
    values: HashMap<String, (u32, Option<Instant>)>,
    /// Oldest first
    order: VecDeque<String>,
}

impl Model {
    fn remove(&mut self, key: &str) -> bool {
        self.order.retain(|k| k != key);
        self.values.remove(key).is_some()
    }

    fn set(&mut self, key: String, value: u32, ttl: Option<u64>, now: Instant) {
        self.remove(&key);
        let expires_at = ttl
            .filter(|&s| s > 0)
            .map(|s| now + Duration::from_secs(s));
        self.values.insert(key.clone(), (value, expires_at));
        self.order.push_back(key);
    }

    fn get(&mut self, key: &str, now: Instant) -> Option<u32> {
        let (value, expires_at) = *self.values.get(key)?;
        if expires_at.is_some_and(|at| now >= at) {
            self.remove(key);
            return None;
        }
        self.order.retain(|k| k != key);
        self.order.push_back(key.to_string());
        Some(value)
    }

    fn sweep(&mut self, now: Instant, capacity: usize, target: usize) {
        let expired: Vec<String> = self
            .values
            .iter()
            .filter(|(_, (_, at))| at.is_some_and(|at| now >= at))
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            self.remove(&key);
        }
        if self.values.len() > capacity {
            while self.values.len() > target {
                let Some(oldest) = self.order.front().cloned() else {
                    break;
                };
                self.remove(&oldest);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Every reachable state keeps the table, both indices and the counter in
    // agreement, and matches the reference model.
    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let config = CacheConfig::with_capacity(TEST_CAPACITY);
        let target = config.sweep_target();
        let mut store: CacheStore<String, u32> = CacheStore::new(&config);
        let mut model = Model::default();
        let mut now = Instant::now();

        for op in ops {
            match op {
                CacheOp::Set { key, value, ttl } => {
                    store.set_at(key.clone(), value, ttl, now);
                    model.set(key, value, ttl, now);
                }
                CacheOp::Get { key } => {
                    let got = store.get_at(&key, now).map(|v| *v);
                    prop_assert_eq!(got, model.get(&key, now), "get mismatch for {}", key);
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(store.delete(&key), model.remove(&key));
                }
                CacheOp::Advance { secs } => {
                    now += Duration::from_secs(secs);
                }
                CacheOp::Sweep => {
                    store.sweep_at(now);
                    model.sweep(now, TEST_CAPACITY, target);
                    prop_assert!(store.len() <= TEST_CAPACITY);
                }
            }

            store.assert_consistent();
            prop_assert_eq!(store.len(), model.values.len());
            prop_assert_eq!(store.recency_order(), model.order.iter().cloned().collect::<Vec<_>>());
        }
    }

    // A sweep evicts exactly the least recently used entries, in order.
    #[test]
    fn prop_sweep_evicts_oldest(
        count in (TEST_CAPACITY + 1)..40,
        reads in prop::collection::vec(0usize..40, 0..20)
    ) {
        let config = CacheConfig::with_capacity(TEST_CAPACITY);
        let mut store: CacheStore<usize, usize> = CacheStore::new(&config);
        for i in 0..count {
            store.set(i, i, None);
        }
        for i in reads {
            store.get(&i);
        }

        let before = store.recency_order();
        let report = store.sweep();

        prop_assert_eq!(report.evicted, count - config.sweep_target());
        prop_assert_eq!(store.recency_order(), before[report.evicted..].to_vec());
        store.assert_consistent();
    }

    // Replacing a key any number of times leaves exactly one entry for it.
    #[test]
    fn prop_overwrite_keeps_one_entry(
        values in prop::collection::vec((any::<u32>(), ttl_strategy()), 1..20)
    ) {
        let mut store: CacheStore<&str, u32> = CacheStore::new(&CacheConfig::default());
        let last = values[values.len() - 1].0;

        for (value, ttl) in values {
            store.set("key", value, ttl);
        }

        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.get("key").map(|v| *v), Some(last));
        store.assert_consistent();
    }
}

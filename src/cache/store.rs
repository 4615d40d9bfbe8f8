//! Cache Store Module
//!
//! Engine state combining the entry table, the expiry index and the recency list.
//!
//! Every entry lives in all structures at once, and every removal goes
//! through [`CacheStore::remove_entry`] so no structure is left holding a key
//! the others have dropped. The store itself is single-threaded; the
//! [`Cache`](crate::Cache) handle puts it behind one lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::time::Instant;

use crate::cache::entry::deadline;
use crate::cache::{CacheEntry, CacheStats, ExpiryIndex, RecencyList};
use crate::config::CacheConfig;

// == Sweep Report ==
/// Outcome of one maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries reclaimed because their deadline passed
    pub expired: usize,
    /// Entries evicted from the LRU front to get back under capacity
    pub evicted: usize,
    /// Live entries left after the pass
    pub remaining: usize,
}

// == Cache Store ==
/// Cache state with TTL expiration and LRU eviction.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key -> entry; the single source of truth for membership
    entries: HashMap<K, CacheEntry<V>>,
    /// Deadlines of entries with a TTL, soonest first
    expiry: ExpiryIndex<K>,
    /// Access order of all entries, oldest first
    recency: RecencyList<K>,
    /// Live entry count
    live: usize,
    /// Performance statistics
    stats: CacheStats,
    /// Live count above which a sweep evicts
    capacity: usize,
    /// Live count an over-capacity sweep evicts down to
    sweep_target: usize,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore sized from the config.
    ///
    /// The config is expected to be validated already.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            expiry: ExpiryIndex::new(),
            recency: RecencyList::new(),
            live: 0,
            stats: CacheStats::new(),
            capacity: config.capacity,
            sweep_target: config.sweep_target(),
        }
    }

    // == Set ==
    /// Stores a value, replacing any live entry for the key.
    ///
    /// `ttl` is in seconds; `None` or `Some(0)` stores an entry that never
    /// expires. Set never evicts; capacity is enforced by [`sweep`](Self::sweep).
    pub fn set(&mut self, key: K, value: V, ttl: Option<u64>) {
        self.set_at(key, value, ttl, Instant::now());
    }

    /// [`set`](Self::set) with an explicit clock reading.
    pub fn set_at(&mut self, key: K, value: V, ttl: Option<u64>, now: Instant) {
        // Replacing drops the old entry from every index before reinserting
        self.remove_entry(&key);

        let expires_at = deadline(now, ttl);
        let expiry = expires_at.map(|at| self.expiry.insert(at, key.clone()));
        let recency = self.recency.push_back(key.clone());

        self.entries.insert(
            key,
            CacheEntry {
                value: Arc::new(value),
                expires_at,
                expiry,
                recency,
            },
        );
        self.live += 1;
    }

    // == Get ==
    /// Retrieves a value by key and marks it as just accessed.
    ///
    /// An entry found past its deadline is removed and reported as absent.
    pub fn get<Q>(&mut self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_at(key, Instant::now())
    }

    /// [`get`](Self::get) with an explicit clock reading.
    pub fn get_at<Q>(&mut self, key: &Q, now: Instant) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired(now) {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        let value = Arc::clone(&entry.value);
        self.recency.move_to_back(entry.recency);
        self.stats.record_hit();
        Some(value)
    }

    // == Delete ==
    /// Removes an entry by key, returning whether one was present.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    // == Contains ==
    /// Checks membership without touching recency or reclaiming expired entries.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    // == Sweep ==
    /// Runs one maintenance pass: reclaim expired entries, then evict from
    /// the LRU front if still over capacity.
    pub fn sweep(&mut self) -> SweepReport {
        self.sweep_at(Instant::now())
    }

    /// [`sweep`](Self::sweep) with an explicit clock reading.
    pub fn sweep_at(&mut self, now: Instant) -> SweepReport {
        let expired = self.purge_expired(now);
        let evicted = self.evict_overflow();
        self.stats.record_sweep();

        SweepReport {
            expired,
            evicted,
            remaining: self.live,
        }
    }

    // == Purge Expired ==
    /// Removes every entry whose deadline is at or before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let mut removed = 0;

        while let Some((expires_at, key)) = self.expiry.peek() {
            if expires_at > now {
                break;
            }
            let key = key.clone();
            let entry = self.remove_entry(&key);
            assert!(
                entry.is_some(),
                "expiry index holds a key missing from the entry table"
            );
            removed += 1;
        }

        self.stats.record_expirations(removed);
        removed
    }

    // == Evict Overflow ==
    /// Evicts least recently used entries down to the sweep target, if the
    /// live count exceeds capacity.
    ///
    /// Returns the number of entries evicted.
    pub fn evict_overflow(&mut self) -> usize {
        if self.live <= self.capacity {
            return 0;
        }

        let mut evicted = 0;
        while self.live > self.sweep_target {
            let Some(key) = self.recency.front().cloned() else {
                break;
            };
            let entry = self.remove_entry(&key);
            assert!(
                entry.is_some(),
                "recency list holds a key missing from the entry table"
            );
            evicted += 1;
        }

        self.stats.record_evictions(evicted);
        evicted
    }

    // == Clear ==
    /// Removes every entry, oldest first. Returns the number removed.
    pub fn clear(&mut self) -> usize {
        let mut removed = 0;
        while let Some(key) = self.recency.front().cloned() {
            let entry = self.remove_entry(&key);
            assert!(
                entry.is_some(),
                "recency list holds a key missing from the entry table"
            );
            removed += 1;
        }
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.live);
        stats
    }

    // == Length ==
    /// Returns the current number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    // == Remove Entry ==
    /// The one removal path: drops the key from the table, the expiry index
    /// (if it has a deadline), the recency list and the live count together.
    fn remove_entry<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;

        if let Some(handle) = entry.expiry {
            self.expiry.remove(handle);
        }
        self.recency.remove(entry.recency);
        self.live -= 1;

        Some(entry)
    }

    /// Cross-checks all structures against the entry table.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.entries.len(), self.live, "live counter drifted");
        assert_eq!(self.recency.len(), self.live, "recency list size drifted");

        let with_ttl = self.entries.values().filter(|e| e.expires_at.is_some()).count();
        assert_eq!(self.expiry.len(), with_ttl, "expiry index size drifted");

        for (key, entry) in &self.entries {
            assert!(self.recency.get(entry.recency) == Some(key), "recency handle stale");
            match (entry.expires_at, entry.expiry) {
                (Some(at), Some(handle)) => {
                    assert!(self.expiry.get(handle) == Some((at, key)));
                }
                (None, None) => {}
                _ => panic!("expiry handle out of sync with deadline"),
            }
        }
        self.expiry.assert_consistent();
    }

    /// Keys from least to most recently used.
    #[cfg(test)]
    pub(crate) fn recency_order(&self) -> Vec<K> {
        self.recency.keys().into_iter().cloned().collect()
    }
}

//! Cache Engine
//!
//! The public, thread-safe cache handle.
//!
//! A [`Cache`] owns one [`CacheStore`] behind a single async mutex and one
//! background maintenance task that sweeps it on a timer. Every operation
//! holds the lock for its whole critical section, so the table and both
//! eviction indices are always seen in agreement. Share a cache between
//! tasks with `Arc<Cache<K, V>>`.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{CacheStats, CacheStore, SweepReport};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_maintenance_task, SharedStore};

/// Stop signal and join handle of a running maintenance task.
#[derive(Debug)]
struct Maintenance {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

// == Cache ==
/// In-process key/value cache with per-entry TTL and LRU capacity eviction.
///
/// # Example
/// ```no_run
/// # async fn demo() -> mini_cache::error::Result<()> {
/// use mini_cache::{Cache, CacheConfig};
///
/// let cache: Cache<String, Vec<u8>> = Cache::new(CacheConfig::with_capacity(1000))?;
/// cache.set("session".to_string(), vec![1, 2, 3], Some(60)).await;
/// assert!(cache.get("session").await.is_some());
/// cache.shutdown().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Cache<K, V> {
    store: SharedStore<K, V>,
    maintenance: Mutex<Option<Maintenance>>,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its maintenance task on the current runtime.
    ///
    /// # Errors
    /// - `InvalidConfig` if the config fails validation
    /// - `NoRuntime` if called outside a tokio runtime
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        let store: SharedStore<K, V> = Arc::new(Mutex::new(CacheStore::new(&config)));
        let (stop, stop_rx) = oneshot::channel();
        let handle =
            spawn_maintenance_task(&runtime, store.clone(), config.sweep_period(), stop_rx);

        info!(
            "Cache created: capacity={}, sweep_interval={}s, sweep_target={}",
            config.capacity,
            config.sweep_interval,
            config.sweep_target()
        );

        Ok(Self {
            store,
            maintenance: Mutex::new(Some(Maintenance { stop, handle })),
        })
    }

    /// Creates a cache with default settings and the given capacity.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(CacheConfig::with_capacity(capacity))
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for the key.
    ///
    /// `ttl` is in seconds; `None` or `Some(0)` means the entry never expires.
    pub async fn set(&self, key: K, value: V, ttl: Option<u64>) {
        self.store.lock().await.set(key, value, ttl);
    }

    // == Get ==
    /// Returns the value for `key`, or None if absent or expired.
    ///
    /// A hit marks the entry as most recently used. An expired entry found
    /// here is removed on the spot.
    pub async fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().await.get(key)
    }

    // == Delete ==
    /// Removes `key`, returning whether an entry was present.
    pub async fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().await.delete(key)
    }

    // == Size ==
    /// Returns the live entry count at the moment the lock was held.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    // == Sweep ==
    /// Runs one maintenance pass now, outside the timer.
    pub async fn sweep(&self) -> SweepReport {
        self.store.lock().await.sweep()
    }

    // == Shutdown ==
    /// Stops the maintenance task, then removes every entry.
    ///
    /// Waits for the task to finish before draining, so no sweep runs after
    /// this returns. Returns the number of entries drained.
    ///
    /// # Errors
    /// `AlreadyShutdown` if called more than once.
    pub async fn shutdown(&self) -> Result<usize> {
        let Maintenance { stop, handle } = self
            .maintenance
            .lock()
            .await
            .take()
            .ok_or(CacheError::AlreadyShutdown)?;

        // The task only exits early if it panicked, in which case the send fails
        if stop.send(()).is_err() {
            warn!("Cache maintenance task had already exited");
        }
        if let Err(err) = handle.await {
            warn!("Cache maintenance task ended abnormally: {}", err);
        }

        let drained = self.store.lock().await.clear();
        info!("Cache shut down, drained {} entries", drained);
        Ok(drained)
    }
}

impl<K, V> Drop for Cache<K, V> {
    fn drop(&mut self) {
        // Dropping the sender ends the task on its next poll
        if let Some(maintenance) = self.maintenance.get_mut().take() {
            drop(maintenance.stop);
        }
    }
}

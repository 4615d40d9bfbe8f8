//! Maintenance Task
//!
//! Background task that periodically sweeps a cache store.
//!
//! The task is `Running` until its stop channel fires or is dropped, then it
//! returns and never ticks again.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::config::MAX_SWEEP_INTERVAL;

/// Shortest period the ticker accepts.
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

/// A cache store behind the single lock shared by callers and the sweeper.
pub type SharedStore<K, V> = Arc<Mutex<CacheStore<K, V>>>;

/// Spawns a task that sweeps `store` every `interval`.
///
/// Each tick takes the store lock once, reclaims expired entries, then evicts
/// from the LRU front while over capacity. The task ends when `stop` receives
/// a value or its sender is dropped; it observes either at once, even in the
/// middle of an interval.
///
/// # Arguments
/// * `runtime` - Runtime the task is spawned on
/// * `store` - Shared store to sweep
/// * `interval` - Time between sweeps, clamped to between 1 ms and
///   [`MAX_SWEEP_INTERVAL`]; the first sweep runs one interval after spawn
/// * `stop` - One-shot shutdown signal
pub fn spawn_maintenance_task<K, V>(
    runtime: &Handle,
    store: SharedStore<K, V>,
    interval: Duration,
    mut stop: oneshot::Receiver<()>,
) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + Sync + 'static,
{
    let interval = interval.clamp(MIN_SWEEP_PERIOD, Duration::from_secs(MAX_SWEEP_INTERVAL));

    runtime.spawn(async move {
        info!(
            "Starting cache maintenance task with interval of {:?}",
            interval
        );

        let start = Instant::now()
            .checked_add(interval)
            .unwrap_or_else(Instant::now);
        let mut ticker = time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = {
                        let mut guard = store.lock().await;
                        guard.sweep_at(Instant::now())
                    };

                    if report.expired > 0 || report.evicted > 0 {
                        info!(
                            "Cache sweep: expired {} entries, evicted {} entries, {} remaining",
                            report.expired, report.evicted, report.remaining
                        );
                    } else {
                        debug!("Cache sweep: nothing to reclaim, {} entries", report.remaining);
                    }
                }
                _ = &mut stop => {
                    break;
                }
            }
        }

        info!("Cache maintenance task stopped");
    })
}

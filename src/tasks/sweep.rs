//! TTL Sweep Task
//!
//! Background task that periodically removes expired process cache entries,
//! bounding memory even for keys that are never read again.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::{duration_ms, ProcessCache};

/// Spawns the periodic sweep over `cache`.
///
/// The task stops when `shutdown` carries `true` or its sender is dropped.
/// Ticks that come due while a sweep is still running are skipped rather
/// than queued, so sweeps never overlap or run back to back.
///
/// # Example
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = spawn_sweep_task(cache.clone(), Duration::from_secs(300), shutdown_rx);
/// // Later, during shutdown:
/// shutdown_tx.send(true).ok();
/// handle.await.ok();
/// ```
pub fn spawn_sweep_task<V>(
    cache: ProcessCache<V>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    // interval() rejects a zero period
    let interval = interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        info!(interval_ms = duration_ms(interval), "starting TTL sweep task");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }

        info!("TTL sweep task stopped");
    })
}

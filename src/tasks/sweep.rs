//! Expiration Sweep Task
//!
//! Background task that periodically removes expired entries from a store.
//! Expiration is otherwise lazy (checked on each read), so the sweep only
//! matters for entries nobody reads anymore.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task loops forever, sleeping `interval` between sweeps. Stores are
/// cheap clones sharing state, so the caller keeps using its own handle.
///
/// # Arguments
/// * `store` - The store to sweep
/// * `interval` - Time between sweeps
///
/// # Returns
/// A JoinHandle that can be aborted during shutdown.
pub fn spawn_sweep_task<V>(store: CacheStore<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            cache = %store.name(),
            interval_ms = interval.as_millis() as u64,
            "starting expiration sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.sweep_expired().await;
            if removed > 0 {
                info!(cache = %store.name(), removed, "sweep removed expired entries");
            } else {
                debug!(cache = %store.name(), "sweep found no expired entries");
            }
        }
    })
}

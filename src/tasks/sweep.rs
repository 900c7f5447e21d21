//! Expiration Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::panic;
use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::error::{CacheError, Result};

/// Spawns a background task that sweeps expired entries once per `period`.
///
/// The first sweep runs one full period after this call. Each pass takes the
/// store lock once and releases it before waiting for the next tick.
///
/// The task exits when `shutdown` is set to true, when its sender is dropped,
/// or when the store itself has been dropped. It only holds a weak reference,
/// so it never keeps a discarded cache alive.
///
/// # Arguments
/// * `runtime` - Runtime the task is spawned on
/// * `store` - Weak reference to the shared store
/// * `period` - Time between sweeps
/// * `shutdown` - Receiver that flips to true when the cache is closed
///
/// # Errors
/// - `InvalidConfig` if the first sweep would fall past the end of `Instant`
/// - `Runtime` if the runtime was built without its time driver
pub fn spawn_sweep_task(
    runtime: &Handle,
    store: Weak<Mutex<CacheStore>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>> {
    let first_tick = Instant::now().checked_add(period).ok_or_else(|| {
        CacheError::InvalidConfig(format!("sweep period {period:?} is out of range"))
    })?;

    // Timers need the runtime context even before the task is polled
    let _guard = runtime.enter();

    // tokio reports a missing time driver only by panicking
    let mut ticker = panic::catch_unwind(|| tokio::time::interval_at(first_tick, period))
        .map_err(|_| {
            CacheError::Runtime("cannot start expiration sweep: timers are disabled".to_string())
        })?;
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let handle = runtime.spawn(async move {
        info!(?period, "Starting expiration sweep task");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(store) = store.upgrade() else {
                        debug!("Cache dropped, sweep task exiting");
                        break;
                    };

                    let removed = store.lock().sweep_expired(Instant::now());

                    if removed > 0 {
                        info!("Expiration sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Expiration sweep: no expired entries found");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Expiration sweep task stopped");
    });

    Ok(handle)
}

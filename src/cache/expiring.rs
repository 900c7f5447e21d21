//! Expiring Cache Module
//!
//! The public, thread-safe cache: a mutex-guarded `CacheStore` plus the
//! background task that sweeps it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweep_task;

// == Expiring Cache ==
/// Concurrency-safe byte cache whose entries expire a fixed interval after
/// insertion.
///
/// Every `add`, `get`, and sweep pass takes the same lock exactly once, so a
/// value added by one thread is visible to any `get` that starts after the
/// `add` returns. Expiration is enforced only by the background sweep: an
/// entry may outlive its interval by up to one sweep period.
///
/// Construction must happen inside a tokio runtime, which hosts the sweep
/// task. `add` and `get` are synchronous and may be called from any thread.
///
/// # Example
/// ```no_run
/// # async fn demo() -> pokecache::Result<()> {
/// use std::time::Duration;
/// use pokecache::ExpiringCache;
///
/// let cache = ExpiringCache::new(Duration::from_secs(5))?;
/// cache.add("https://example.com/resource", &b"{}"[..]);
/// assert!(cache.get("https://example.com/resource").is_some());
/// cache.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ExpiringCache {
    store: Arc<Mutex<CacheStore>>,
    config: CacheConfig,
    shutdown_tx: watch::Sender<bool>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl ExpiringCache {
    // == Constructor ==
    /// Creates a cache whose entries expire after `interval`, swept once per
    /// `interval`.
    ///
    /// Fails with `InvalidConfig` for a zero interval or one too large to
    /// schedule, and with `Runtime` when called outside a tokio runtime or on
    /// one built without timers.
    pub fn new(interval: Duration) -> Result<Self> {
        Self::with_config(CacheConfig::new(interval))
    }

    /// Creates a cache from a full configuration.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let runtime = Handle::try_current().map_err(|e| {
            CacheError::Runtime(format!("cannot start expiration sweep: {e}"))
        })?;

        let store = Arc::new(Mutex::new(CacheStore::new(config.interval)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_sweep_task(
            &runtime,
            Arc::downgrade(&store),
            config.effective_sweep_interval(),
            shutdown_rx,
        )?;

        debug!(
            interval = ?config.interval,
            sweep = ?config.effective_sweep_interval(),
            "Expiring cache created"
        );

        Ok(Self {
            store,
            config,
            shutdown_tx,
            sweeper: Mutex::new(Some(handle)),
        })
    }

    /// Returns the expiration interval.
    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Returns the period of the background sweep.
    pub fn sweep_interval(&self) -> Duration {
        self.config.effective_sweep_interval()
    }

    // == Add ==
    /// Stores `value` under `key`, replacing any existing entry and resetting
    /// its age to zero.
    pub fn add(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        let key = key.into();
        let value = value.into();

        trace!(key = %key, len = value.len(), "cache add");
        self.store.lock().add(key, value);
    }

    // == Get ==
    /// Returns the payload stored under `key`, or `None` if it was never
    /// added or has been swept.
    ///
    /// An empty payload is returned as `Some(empty)`. Reading does not extend
    /// the entry's lifetime.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let value = self.store.lock().get(key);
        trace!(key, hit = value.is_some(), "cache get");
        value
    }

    /// Returns true if `key` currently has an entry. Not counted in stats.
    pub fn contains(&self, key: &str) -> bool {
        self.store.lock().contains(key)
    }

    // == Read Through ==
    /// Returns the cached payload for `key`, or runs `fetch` on a miss and
    /// caches its result.
    ///
    /// The lock is not held while `fetch` runs, so concurrent misses on the
    /// same key may each fetch; the last one to finish wins. A failed fetch
    /// stores nothing and its error is returned unchanged.
    pub async fn get_or_try_insert_with<F, Fut, V, E>(
        &self,
        key: &str,
        fetch: F,
    ) -> std::result::Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        V: Into<Bytes>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value: Bytes = fetch().await?.into();
        self.add(key, value.clone());
        Ok(value)
    }

    // == Introspection ==
    /// Returns the number of entries not yet swept.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    // == Shutdown ==
    /// Signals the sweep task to stop. Idempotent.
    ///
    /// The cache stays usable afterwards, but entries no longer expire.
    pub fn close(&self) {
        let was_closed = self.shutdown_tx.send_replace(true);
        if !was_closed {
            debug!("Expiring cache closed");
        }
    }

    /// Returns true once `close` or `shutdown` has been called.
    pub fn is_closed(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Closes the cache and waits for the sweep task to finish.
    pub async fn shutdown(&self) {
        self.close();

        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Expiration sweep task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for ExpiringCache {
    fn drop(&mut self) {
        self.close();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_new_rejects_zero_interval() {
        let result = ExpiringCache::new(Duration::ZERO);
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_new_rejects_unrepresentable_interval() {
        let result = ExpiringCache::new(Duration::MAX);
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));

        let result = ExpiringCache::with_config(
            CacheConfig::new(INTERVAL).with_sweep_interval(Duration::MAX),
        );
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_without_time_driver_fails() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let result = runtime.block_on(async { ExpiringCache::new(Duration::from_secs(1)) });
        assert!(matches!(result, Err(CacheError::Runtime(_))));
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let result = ExpiringCache::new(INTERVAL);
        assert!(matches!(result, Err(CacheError::Runtime(_))));
    }

    #[tokio::test]
    async fn test_accessors() {
        let cache = ExpiringCache::with_config(
            CacheConfig::new(INTERVAL).with_sweep_interval(Duration::from_millis(20)),
        )
        .unwrap();

        assert_eq!(cache.interval(), INTERVAL);
        assert_eq!(cache.sweep_interval(), Duration::from_millis(20));
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_get_contains() {
        let cache = ExpiringCache::new(INTERVAL).unwrap();

        cache.add("k", vec![1u8, 2, 3]);

        assert_eq!(cache.get("k"), Some(Bytes::from_static(&[1, 2, 3])));
        assert!(cache.contains("k"));
        assert!(!cache.contains("other"));
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_through_caches_on_miss() {
        let cache = ExpiringCache::new(INTERVAL).unwrap();
        let mut calls = 0;

        let value = cache
            .get_or_try_insert_with("url", || {
                calls += 1;
                async { Ok::<_, std::io::Error>(&b"payload"[..]) }
            })
            .await
            .unwrap();
        assert_eq!(value, Bytes::from_static(b"payload"));

        let value = cache
            .get_or_try_insert_with("url", || {
                calls += 1;
                async { Ok::<_, std::io::Error>(&b"other"[..]) }
            })
            .await
            .unwrap();
        assert_eq!(value, Bytes::from_static(b"payload"));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_through_error_stores_nothing() {
        let cache = ExpiringCache::new(INTERVAL).unwrap();

        let result = cache
            .get_or_try_insert_with("url", || async { Err::<Bytes, _>("offline") })
            .await;

        assert_eq!(result, Err("offline"));
        assert!(!cache.contains("url"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_idempotent_and_stops_sweeping() {
        let cache = ExpiringCache::new(INTERVAL).unwrap();
        assert!(!cache.is_closed());

        cache.close();
        cache.close();
        assert!(cache.is_closed());

        cache.add("k", &b"v"[..]);
        tokio::time::sleep(INTERVAL * 3).await;

        assert_eq!(cache.get("k"), Some(Bytes::from_static(b"v")));
        assert_eq!(cache.stats().sweeps, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_joins_sweep_task() {
        let cache = ExpiringCache::new(INTERVAL).unwrap();

        cache.shutdown().await;
        assert!(cache.is_closed());
        assert!(cache.sweeper.lock().is_none());

        // A second shutdown has nothing left to join
        cache.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_sweep_task() {
        let cache = ExpiringCache::new(INTERVAL).unwrap();
        let handle = cache.sweeper.lock().take().unwrap();

        drop(cache);
        handle.await.unwrap();
    }
}

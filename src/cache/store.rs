//! Cache Store Module
//!
//! Unsynchronised map from keys to timestamped payloads. `ExpiringCache`
//! wraps it in a mutex and drives `sweep_expired` from the background task.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats};

// == Cache Store ==
/// Key/value storage with insertion-time expiration.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Age at which entries are swept
    interval: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store whose entries expire after `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            interval,
        }
    }

    /// Returns the expiration interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Add ==
    /// Stores a payload under `key`.
    ///
    /// An existing entry is replaced and its age reset to zero.
    /// Returns true if an entry was overwritten.
    pub fn add(&mut self, key: String, value: Bytes) -> bool {
        self.add_at(key, value, Instant::now())
    }

    pub(crate) fn add_at(&mut self, key: String, value: Bytes, now: Instant) -> bool {
        let overwritten = self
            .entries
            .insert(key, CacheEntry::created_at(value, now))
            .is_some();
        self.stats.set_total_entries(self.entries.len());
        overwritten
    }

    // == Get ==
    /// Retrieves the payload stored under `key`.
    ///
    /// Presence comes from the map lookup itself, so an empty payload is a
    /// hit. Reading does not change the entry's age.
    pub fn get(&mut self, key: &str) -> Option<Bytes> {
        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// Returns true if `key` has a live entry. Does not count as a hit or miss.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Sweep Expired ==
    /// Removes every entry whose age at `now` is at least the interval.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let interval = self.interval;
        let before = self.entries.len();

        self.entries
            .retain(|_, entry| !entry.is_expired(interval, now));

        let removed = before - self.entries.len();
        self.stats.record_sweep(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

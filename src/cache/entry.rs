//! Cache Entry Module
//!
//! Defines the structure for individual cache entries.

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

// == Cache Entry ==
/// A stored payload and the instant it was added.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Bytes,
    /// Insertion instant (monotonic)
    pub created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(value: Bytes) -> Self {
        Self::created_at(value, Instant::now())
    }

    /// Creates an entry with an explicit insertion instant.
    pub fn created_at(value: Bytes, created_at: Instant) -> Self {
        Self { value, created_at }
    }

    // == Age ==
    /// Time elapsed between insertion and `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `interval`.
    ///
    /// Boundary condition: an entry whose age equals the interval exactly is
    /// expired.
    pub fn is_expired(&self, interval: Duration, now: Instant) -> bool {
        self.age(now) >= interval
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(Bytes::from_static(b"payload"));

        assert_eq!(entry.value, Bytes::from_static(b"payload"));
        assert!(!entry.is_expired(Duration::from_secs(60), Instant::now()));
    }

    #[test]
    fn test_entry_empty_value() {
        let entry = CacheEntry::new(Bytes::new());
        assert!(entry.value.is_empty());
    }

    #[test]
    fn test_entry_age() {
        let start = Instant::now();
        let entry = CacheEntry::created_at(Bytes::new(), start);

        assert_eq!(entry.age(start), Duration::ZERO);
        assert_eq!(
            entry.age(start + Duration::from_millis(40)),
            Duration::from_millis(40)
        );
    }

    #[test]
    fn test_entry_age_before_creation_is_zero() {
        let start = Instant::now();
        let entry = CacheEntry::created_at(Bytes::new(), start + Duration::from_secs(1));

        assert_eq!(entry.age(start), Duration::ZERO);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let start = Instant::now();
        let interval = Duration::from_millis(100);
        let entry = CacheEntry::created_at(Bytes::from_static(b"x"), start);

        assert!(!entry.is_expired(interval, start + Duration::from_millis(99)));
        assert!(
            entry.is_expired(interval, start + interval),
            "Entry should be expired at boundary"
        );
        assert!(entry.is_expired(interval, start + Duration::from_millis(250)));
    }
}

//! Cache Module
//!
//! Provides the in-memory store with insertion-time expiration and the
//! thread-safe `ExpiringCache` built on it.

mod entry;
mod expiring;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use expiring::ExpiringCache;
pub use stats::CacheStats;
pub use store::CacheStore;

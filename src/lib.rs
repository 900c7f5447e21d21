//! Pokecache - A concurrency-safe expiring cache
//!
//! Stores opaque byte payloads under string keys. Every entry expires a fixed
//! interval after it was added; a background task sweeps expired entries so
//! callers never manage expiration themselves.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, ExpiringCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};

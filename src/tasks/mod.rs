//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - Expiration sweep: removes entries older than the cache interval

mod sweep;

pub use sweep::spawn_sweep_task;

//! Error types for the expiring cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Only construction can fail. `add` and `get` report absence through
/// `Option`, never through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Configuration rejected (zero interval, malformed environment value)
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The background sweep task could not be scheduled
    #[error("Runtime error: {0}")]
    Runtime(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Expiration interval used when nothing else is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Environment variable holding the expiration interval in milliseconds.
pub const INTERVAL_ENV: &str = "POKECACHE_INTERVAL_MS";

/// Environment variable holding the sweep period in milliseconds.
pub const SWEEP_INTERVAL_ENV: &str = "POKECACHE_SWEEP_INTERVAL_MS";

/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Age at which an entry becomes eligible for removal
    pub interval: Duration,
    /// Period of the background sweep; `None` sweeps once per `interval`
    pub sweep_interval: Option<Duration>,
}

impl CacheConfig {
    /// Creates a config that expires entries after `interval` and sweeps
    /// once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            sweep_interval: None,
        }
    }

    /// Sets a sweep period different from the expiration interval.
    ///
    /// A shorter period tightens the worst-case lifetime of an entry from
    /// `2 * interval` to `interval + sweep_interval`.
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = Some(sweep_interval);
        self
    }

    /// Creates a new config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `POKECACHE_INTERVAL_MS` - Expiration interval in milliseconds (default: 5000)
    /// - `POKECACHE_SWEEP_INTERVAL_MS` - Sweep period in milliseconds (default: the interval)
    ///
    /// Unset variables fall back to defaults; values that are set but do not
    /// parse are rejected rather than silently ignored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval = parse_millis(INTERVAL_ENV, lookup(INTERVAL_ENV))?.unwrap_or(DEFAULT_INTERVAL);
        let sweep_interval = parse_millis(SWEEP_INTERVAL_ENV, lookup(SWEEP_INTERVAL_ENV))?;

        let config = Self {
            interval,
            sweep_interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero durations.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "interval must be a positive duration".to_string(),
            ));
        }

        if matches!(self.sweep_interval, Some(sweep) if sweep.is_zero()) {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be a positive duration".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the period the background sweep actually runs at.
    pub fn effective_sweep_interval(&self) -> Duration {
        self.sweep_interval.unwrap_or(self.interval)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

fn parse_millis(name: &str, raw: Option<String>) -> Result<Option<Duration>> {
    match raw {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| CacheError::InvalidConfig(format!("{name}={raw:?}: {e}"))),
    }
}

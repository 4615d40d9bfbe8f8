//! Configuration Module
//!
//! Handles loading and validating cache configuration.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Longest accepted sweep interval in seconds (one year).
pub const MAX_SWEEP_INTERVAL: u64 = 365 * 24 * 60 * 60;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Number of live entries above which a sweep starts LRU eviction
    pub capacity: usize,
    /// Interval in seconds between maintenance sweeps
    pub sweep_interval: u64,
    /// Fraction of capacity freed by an over-capacity sweep, in `[0, 1)`
    pub eviction_headroom: f64,
}

impl CacheConfig {
    /// Creates a default config with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum live entries (default: 1000)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 10)
    /// - `CACHE_EVICTION_HEADROOM` - Fraction of capacity freed on overflow (default: 0.2)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval),
            eviction_headroom: env::var("CACHE_EVICTION_HEADROOM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.eviction_headroom),
        }
    }

    // == Validate ==
    /// Rejects a zero capacity, an interval of zero or above
    /// [`MAX_SWEEP_INTERVAL`], or a headroom outside `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be positive".to_string(),
            ));
        }
        if self.sweep_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be positive".to_string(),
            ));
        }
        if self.sweep_interval > MAX_SWEEP_INTERVAL {
            return Err(CacheError::InvalidConfig(format!(
                "sweep interval must be at most {} seconds, got {}",
                MAX_SWEEP_INTERVAL, self.sweep_interval
            )));
        }
        if !(0.0..1.0).contains(&self.eviction_headroom) {
            return Err(CacheError::InvalidConfig(format!(
                "eviction headroom must be in [0, 1), got {}",
                self.eviction_headroom
            )));
        }
        Ok(())
    }

    /// Returns the sweep interval as a Duration.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    // == Sweep Target ==
    /// Live-entry count an over-capacity sweep evicts down to.
    ///
    /// Never exceeds `capacity` and never drops below 1.
    pub fn sweep_target(&self) -> usize {
        let freed = (self.capacity as f64 * self.eviction_headroom).floor() as usize;
        self.capacity.saturating_sub(freed).max(1)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            sweep_interval: 10,
            eviction_headroom: 0.2,
        }
    }
}

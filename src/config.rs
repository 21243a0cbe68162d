//! Configuration Module
//!
//! Construction parameters for a cache, with validation and an
//! environment loader used by the demo binary.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub capacity: usize,
    /// Maximum idle age of an entry since its last access
    pub ttl: Duration,
    /// Period between background sweeps
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a config from explicit values. Call [`CacheConfig::validate`]
    /// (or build a cache from it) to check them.
    pub fn new(capacity: usize, ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            capacity,
            ttl,
            sweep_interval,
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum live entries (default: 10)
    /// - `CACHE_TTL_SECS` - Entry TTL in seconds (default: 10)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Reaper interval in seconds (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            ttl: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.ttl),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
        }
    }

    // == Validate ==
    /// Rejects a zero capacity, a zero TTL or a zero sweep interval.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidCapacity(self.capacity));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidTtl);
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            ttl: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, 10);
        assert_eq!(config.ttl, Duration::from_secs(10));
        assert_eq!(config.sweep_interval, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_CAPACITY");
        env::remove_var("CACHE_TTL_SECS");
        env::remove_var("CACHE_SWEEP_INTERVAL_SECS");

        let config = CacheConfig::from_env();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = CacheConfig::new(0, Duration::from_secs(1), Duration::from_secs(1));
        assert_eq!(config.validate(), Err(CacheError::InvalidCapacity(0)));
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let config = CacheConfig::new(5, Duration::ZERO, Duration::from_secs(1));
        assert_eq!(config.validate(), Err(CacheError::InvalidTtl));
    }

    #[test]
    fn test_validate_rejects_zero_sweep_interval() {
        let config = CacheConfig::new(5, Duration::from_secs(1), Duration::ZERO);
        assert_eq!(config.validate(), Err(CacheError::InvalidSweepInterval));
    }
}

//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Only construction can fail. A lookup miss is reported through `Option`,
/// never through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must allow at least one entry
    #[error("Invalid cache capacity {0}, must be greater than 0")]
    InvalidCapacity(usize),

    /// TTL must be a positive duration
    #[error("Invalid cache item ttl, must be greater than 0")]
    InvalidTtl,

    /// Sweep interval must be a positive duration
    #[error("Invalid sweep interval, must be greater than 0")]
    InvalidSweepInterval,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::InvalidCapacity(0).to_string(),
            "Invalid cache capacity 0, must be greater than 0"
        );
        assert!(CacheError::InvalidTtl.to_string().contains("ttl"));
        assert!(CacheError::InvalidSweepInterval
            .to_string()
            .contains("sweep interval"));
    }
}

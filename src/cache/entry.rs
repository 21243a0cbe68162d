//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with idle-age tracking.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and recency metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The key this entry is indexed under
    pub key: K,
    /// The stored value
    pub value: V,
    /// Instant of creation or of the most recent get/put touching this entry
    pub last_access: Instant,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new cache entry last accessed at `now`.
    pub fn new(key: K, value: V, now: Instant) -> Self {
        Self {
            key,
            value,
            last_access: now,
        }
    }

    // == Age ==
    /// Returns how long the entry has been idle as seen from `now`.
    ///
    /// Saturates to zero when `now` predates the last access, so an entry
    /// touched after a sweep snapshot was taken never looks old.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_access)
    }

    // == Is Expired ==
    /// Checks if the entry has been idle for at least `ttl`.
    ///
    /// Boundary condition: an entry whose age equals the TTL exactly is
    /// already expired.
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        self.age(now) >= ttl
    }

    // == Touch ==
    /// Refreshes the last access instant.
    pub fn touch(&mut self, now: Instant) {
        self.last_access = now;
    }
}

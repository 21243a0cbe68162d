//! Cache Store Module
//!
//! Main cache engine combining a HashMap index with the recency list and TTL expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::cache::{CacheEntry, RecencyList};
use crate::error::{CacheError, Result};

// == Sweep Report ==
/// Outcome of one expiry sweep over the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries evaluated against the snapshot
    pub scanned: usize,
    /// Entries removed as expired
    pub removed: usize,
    /// False when the scan stopped before reaching the head of the list
    pub completed: bool,
}

// == Store ==
/// Capacity-bounded, recency-ordered storage with idle-age expiry.
///
/// `index` maps every live key to its slot in `order`; both are updated
/// together by every insert, move and removal. The store has no locking of
/// its own and every method takes the caller's notion of `now`.
#[derive(Debug)]
pub struct Store<K, V> {
    /// Key to slot in `order`
    index: HashMap<K, usize>,
    /// Entries, most recently used first
    order: RecencyList<K, V>,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Maximum idle age
    ttl: Duration,
}

impl<K, V> Store<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new Store with specified capacity and TTL.
    ///
    /// # Errors
    /// `InvalidCapacity` when `capacity` is zero, `InvalidTtl` when `ttl` is zero.
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl);
        }

        Ok(Self {
            index: HashMap::with_capacity(capacity),
            order: RecencyList::with_capacity(capacity),
            capacity,
            ttl,
        })
    }

    // == Get ==
    /// Retrieves a value by key, refreshing its recency.
    ///
    /// An entry idle for at least the TTL is removed and reported as a miss.
    pub fn get<Q>(&mut self, key: &Q, now: Instant) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;

        let expired = self
            .order
            .get(idx)
            .map_or(true, |entry| entry.is_expired(self.ttl, now));
        if expired {
            self.remove_slot(idx);
            return None;
        }

        self.order.move_to_front(idx);
        let entry = self.order.get_mut(idx)?;
        entry.touch(now);
        Some(&entry.value)
    }

    // == Put ==
    /// Stores a key-value pair as the most recently used entry.
    ///
    /// If the key already exists, the value is replaced and its age reset.
    /// If the key is new and the store is full, the least recently used
    /// entry is evicted first and returned.
    pub fn put(&mut self, key: K, value: V, now: Instant) -> Option<CacheEntry<K, V>> {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(idx) {
                entry.value = value;
                entry.touch(now);
            }
            self.order.move_to_front(idx);
            return None;
        }

        let evicted = if self.order.len() >= self.capacity {
            self.evict_lru()
        } else {
            None
        };

        let idx = self.order.push_front(CacheEntry::new(key.clone(), value, now));
        self.index.insert(key, idx);
        evicted
    }

    // == Remove ==
    /// Removes an entry by key, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        self.order.remove(idx).map(|entry| entry.value)
    }

    // == Contains ==
    /// Checks for a live entry without refreshing its recency.
    pub fn contains_key<Q>(&self, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .get(key)
            .and_then(|&idx| self.order.get(idx))
            .is_some_and(|entry| !entry.is_expired(self.ttl, now))
    }

    // == Sweep Expired ==
    /// Removes every entry idle for at least the TTL as of `now`.
    ///
    /// Walks from the least recently used end. `keep_going` is consulted
    /// before each entry; returning false leaves the rest of the list for a
    /// later sweep.
    pub fn sweep_expired<F>(&mut self, now: Instant, mut keep_going: F) -> SweepReport
    where
        F: FnMut() -> bool,
    {
        let mut report = SweepReport::default();
        let mut cursor = self.order.back();

        while let Some(idx) = cursor {
            if !keep_going() {
                return report;
            }
            // Capture the neighbor before the slot can be unlinked
            cursor = self.order.prev(idx);
            report.scanned += 1;

            let expired = self
                .order
                .get(idx)
                .is_some_and(|entry| entry.is_expired(self.ttl, now));
            if expired && self.remove_slot(idx).is_some() {
                report.removed += 1;
            }
        }

        report.completed = true;
        report
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.order.iter().map(|(_, entry)| entry.key.clone()).collect()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Maximum number of entries held before eviction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Idle age at which an entry expires.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn evict_lru(&mut self) -> Option<CacheEntry<K, V>> {
        let entry = self.order.pop_back()?;
        self.index.remove(&entry.key);
        trace!(capacity = self.capacity, "evicted least recently used entry");
        Some(entry)
    }

    fn remove_slot(&mut self, idx: usize) -> Option<CacheEntry<K, V>> {
        let entry = self.order.remove(idx)?;
        self.index.remove(&entry.key);
        Some(entry)
    }

    /// Panics if `index` and `order` disagree or the capacity bound is broken.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert!(self.order.len() <= self.capacity, "store exceeds capacity");
        assert_eq!(self.index.len(), self.order.len(), "index/order length mismatch");

        let mut walked = 0;
        for (idx, entry) in self.order.iter() {
            assert_eq!(
                self.index.get(&entry.key),
                Some(&idx),
                "entry not indexed at its slot"
            );
            walked += 1;
        }
        assert_eq!(walked, self.order.len(), "recency list is broken");
    }
}

//! Recency List Module
//!
//! Arena-backed doubly-linked list that keeps cache entries in access order.

use crate::cache::CacheEntry;

/// Null link marker.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot<K, V> {
    entry: Option<CacheEntry<K, V>>,
    prev: usize,
    next: usize,
}

// == Recency List ==
/// Tracks access order for LRU eviction strategy.
///
/// Entries live in a `Vec` of slots linked by index:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// A slot index stays valid until that entry is removed, which lets the
/// store's hash index point straight at a node. Freed slots are chained
/// through `next` and reused by later inserts.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    slots: Vec<Slot<K, V>>,
    head: usize,
    tail: usize,
    free: usize,
    len: usize,
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecencyList<K, V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            free: NIL,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an entry as the most recently used and returns its slot.
    pub fn push_front(&mut self, entry: CacheEntry<K, V>) -> usize {
        let idx = if self.free != NIL {
            let idx = self.free;
            self.free = self.slots[idx].next;
            self.slots[idx] = Slot {
                entry: Some(entry),
                prev: NIL,
                next: NIL,
            };
            idx
        } else {
            self.slots.push(Slot {
                entry: Some(entry),
                prev: NIL,
                next: NIL,
            });
            self.slots.len() - 1
        };

        self.link_front(idx);
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Marks the entry in `idx` as recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if !self.is_live(idx) || self.head == idx {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Removes the entry in `idx`, releasing the slot for reuse.
    pub fn remove(&mut self, idx: usize) -> Option<CacheEntry<K, V>> {
        if !self.is_live(idx) {
            return None;
        }
        self.unlink(idx);
        let entry = self.slots[idx].entry.take();
        self.slots[idx].next = self.free;
        self.free = idx;
        self.len -= 1;
        entry
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<CacheEntry<K, V>> {
        self.back().and_then(|idx| self.remove(idx))
    }

    /// Slot of the least recently used entry.
    pub fn back(&self) -> Option<usize> {
        (self.tail != NIL).then_some(self.tail)
    }

    /// Slot of the most recently used entry.
    pub fn front(&self) -> Option<usize> {
        (self.head != NIL).then_some(self.head)
    }

    /// Slot of the next more recently used entry.
    pub fn prev(&self, idx: usize) -> Option<usize> {
        if !self.is_live(idx) {
            return None;
        }
        let prev = self.slots[idx].prev;
        (prev != NIL).then_some(prev)
    }

    /// Slot of the next less recently used entry.
    pub fn next(&self, idx: usize) -> Option<usize> {
        if !self.is_live(idx) {
            return None;
        }
        let next = self.slots[idx].next;
        (next != NIL).then_some(next)
    }

    pub fn get(&self, idx: usize) -> Option<&CacheEntry<K, V>> {
        self.slots.get(idx).and_then(|slot| slot.entry.as_ref())
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut CacheEntry<K, V>> {
        self.slots.get_mut(idx).and_then(|slot| slot.entry.as_mut())
    }

    /// Iterates `(slot, entry)` pairs from most to least recently used.
    pub fn iter(&self) -> RecencyIter<'_, K, V> {
        RecencyIter {
            list: self,
            cursor: self.front(),
        }
    }

    // == Length ==
    /// Returns the number of tracked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry and releases the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = NIL;
        self.tail = NIL;
        self.free = NIL;
        self.len = 0;
    }

    fn is_live(&self, idx: usize) -> bool {
        self.slots
            .get(idx)
            .is_some_and(|slot| slot.entry.is_some())
    }

    fn link_front(&mut self, idx: usize) {
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let Slot { prev, next, .. } = self.slots[idx];
        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
    }
}

/// Head-to-tail iterator over a [`RecencyList`].
pub struct RecencyIter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for RecencyIter<'a, K, V> {
    type Item = (usize, &'a CacheEntry<K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        self.cursor = self.list.next(idx);
        self.list.get(idx).map(|entry| (idx, entry))
    }
}

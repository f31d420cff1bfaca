//! Slot storage: tagged slots and the contiguous backing store.

use core::mem;
use core::ops::{Index, IndexMut};
use core::slice;

/// One bucket of the table.
///
/// Slot state is an explicit tag rather than a reserved "empty"/"tombstone"
/// key value, so the whole key domain is valid and no sentinel can collide
/// with a real key.
#[derive(Debug)]
pub(crate) enum Slot<K, V> {
    Empty,
    /// Left behind by `erase` so probe chains that ran through this bucket
    /// before the deletion still reach their keys.
    Tombstone,
    Occupied {
        key: K,
        value: V,
    },
}

// Manual impl: the derive would demand `K: Default` and `V: Default`
// even though `Empty` holds neither.
impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    #[inline]
    pub(crate) fn is_tombstone(&self) -> bool {
        matches!(self, Slot::Tombstone)
    }
}

/// Contiguous, exclusively-owned sequence of slots.
///
/// The map keeps the length at a power of two (or zero before the first
/// growth); the store itself only promises indexed access, all-`Empty`
/// allocation, and move-out via `mem::take`/`mem::replace` so `grow` can
/// swap in a fresh store and drain the old one.
pub(crate) struct SlotStore<K, V> {
    slots: Vec<Slot<K, V>>,
}

impl<K, V> Default for SlotStore<K, V> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<K, V> SlotStore<K, V> {
    /// Allocate a store of `n` empty slots.
    pub(crate) fn with_buckets(n: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(n, Slot::default);
        Self { slots }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slots(&self) -> slice::Iter<'_, Slot<K, V>> {
        self.slots.iter()
    }

    pub(crate) fn slots_mut(&mut self) -> slice::IterMut<'_, Slot<K, V>> {
        self.slots.iter_mut()
    }

    /// Consume the store, yielding the `(key, value)` pair of every
    /// occupied slot in store order. Used by rehashing; tombstones and
    /// empty slots are discarded here.
    pub(crate) fn into_entries(self) -> impl Iterator<Item = (K, V)> {
        self.slots.into_iter().filter_map(|slot| match slot {
            Slot::Occupied { key, value } => Some((key, value)),
            Slot::Empty | Slot::Tombstone => None,
        })
    }

    /// Replace the slot at `i`, returning the previous contents.
    #[inline]
    pub(crate) fn replace(&mut self, i: usize, slot: Slot<K, V>) -> Slot<K, V> {
        mem::replace(&mut self.slots[i], slot)
    }
}

impl<K, V> Index<usize> for SlotStore<K, V> {
    type Output = Slot<K, V>;

    #[inline]
    fn index(&self, i: usize) -> &Slot<K, V> {
        &self.slots[i]
    }
}

impl<K, V> IndexMut<usize> for SlotStore<K, V> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut Slot<K, V> {
        &mut self.slots[i]
    }
}

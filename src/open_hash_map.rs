//! `OpenHashMap`: the open-addressing core.

use crate::probe::ProbeSeq;
use crate::reentrancy::ReentrancyCheck;
use crate::store::{Slot, SlotStore};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::slice;
use std::collections::hash_map::RandomState;

/// Outcome of probing for a key.
///
/// A tagged result instead of the classic signed-index encoding
/// (non-negative found / negative insertion point): the miss case carries
/// an [`InsertSlot`] token so the probe work is not repeated on insert.
#[derive(Debug)]
pub enum SearchResult {
    /// Key present at this slot index. The index stays valid for `key`,
    /// `value`, `value_mut` and `erase` until the next growth.
    Found(usize),
    /// Key absent; the token pins the insertion point for
    /// [`OpenHashMap::insert_searched`].
    NotFound(InsertSlot),
}

impl SearchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found(_))
    }
}

/// Opaque insertion point produced by a miss.
///
/// Valid only against the exact table state it was probed on: any
/// intervening insert, erase, or growth makes it stale. Consuming a stale
/// token whose slot has since become occupied panics rather than
/// clobbering the entry.
#[derive(Debug)]
pub struct InsertSlot {
    // None: zero capacity, or a full probe cycle found no empty slot
    // (possible only transiently between growths).
    index: Option<usize>,
}

/// Open-addressing hash map with triangular probing and tombstone-based
/// lazy deletion.
///
/// Entries live directly in a power-of-two slot store. `erase` leaves a
/// tombstone in place of the entry; tombstones keep later-inserted keys
/// reachable, are reused as insertion points, and are swept out wholesale
/// by the next growth. Growth is geometric, so insertion stays amortized
/// O(1).
///
/// Single-threaded by design: no atomics, no locks, `!Sync`. Growth
/// invalidates every outstanding slot index and iterator; `erase`
/// invalidates only the erased position.
pub struct OpenHashMap<K, V, S = RandomState> {
    hasher: S,
    store: SlotStore<K, V>,
    entries: usize,
    tombstones: usize,
    busy: ReentrancyCheck,
}

impl<K, V> OpenHashMap<K, V>
where
    K: Eq + Hash,
{
    /// An empty map with zero capacity; the first insert allocates.
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Pre-size for an expected number of entries.
    pub fn with_capacity(entries_hint: usize) -> Self {
        Self::with_capacity_and_hasher(entries_hint, RandomState::new())
    }
}

impl<K, V> Default for OpenHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OpenHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            store: SlotStore::default(),
            entries: 0,
            tombstones: 0,
            busy: ReentrancyCheck::new(),
        }
    }

    pub fn with_capacity_and_hasher(entries_hint: usize, hasher: S) -> Self {
        let mut map = Self::with_hasher(hasher);
        map.store = SlotStore::with_buckets(Self::bucket_count(entries_hint));
        map
    }

    /// Probe for `key`.
    ///
    /// On a miss the insertion point prefers the first tombstone passed on
    /// this probe over the terminating empty slot, so erased buckets are
    /// reclaimed and probe chains stay short. A full cycle without an
    /// empty slot yields a no-slot token, which `insert_searched` resolves
    /// by rehashing.
    pub fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _busy = self.busy.enter();
        self.probe(key)
    }

    // Probe loop shared by `search`, `insert_searched` and `grow`; callers
    // hold the reentrancy guard.
    fn probe<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let capacity = self.store.len();
        if capacity == 0 {
            return SearchResult::NotFound(InsertSlot { index: None });
        }

        let mask = capacity - 1;
        let mut probe = ProbeSeq::new(self.hasher.hash_one(key), mask);
        let mut tombstone = None;
        for _ in 0..capacity {
            let i = probe.index();
            match &self.store[i] {
                Slot::Occupied { key: occupant, .. } if occupant.borrow() == key => {
                    return SearchResult::Found(i);
                }
                Slot::Occupied { .. } => {}
                Slot::Tombstone => {
                    if tombstone.is_none() {
                        tombstone = Some(i);
                    }
                }
                Slot::Empty => {
                    return SearchResult::NotFound(InsertSlot {
                        index: Some(tombstone.unwrap_or(i)),
                    });
                }
            }
            probe.move_next(mask);
        }
        SearchResult::NotFound(InsertSlot { index: None })
    }

    /// Write `key`/`value` at the insertion point produced by a prior
    /// `search(key)` miss on the current table state. Returns the index
    /// written.
    ///
    /// Grows first, then re-probes, when the table is at capacity or the
    /// token carries no usable slot. Panics if the token's slot has become
    /// occupied since the search (stale token).
    pub fn insert_searched(&mut self, key: K, value: V, slot: InsertSlot) -> usize {
        let _busy = self.busy.enter();
        let mut target = slot.index;
        if self.entries >= self.store.len() || target.is_none() {
            // A no-slot token while entries < capacity means the table is
            // saturated with tombstones; rehashing at the same size sweeps
            // them out.
            self.grow(Self::bucket_count(self.entries).max(self.store.len()));
            target = match self.probe(&key) {
                SearchResult::NotFound(InsertSlot { index }) => index,
                SearchResult::Found(_) => panic!("insert_searched: key already present"),
            };
        }
        let i = target.expect("a freshly grown table has an empty slot");
        self.write_slot(i, key, value)
    }

    /// Search-then-insert convenience. Returns the index written.
    ///
    /// Panics if `key` is already present; branch on `search` and use
    /// `insert_searched` to handle that case without a second probe.
    pub fn insert(&mut self, key: K, value: V) -> usize {
        match self.search(&key) {
            SearchResult::Found(_) => panic!("insert: duplicate key"),
            SearchResult::NotFound(slot) => self.insert_searched(key, value, slot),
        }
    }

    fn write_slot(&mut self, i: usize, key: K, value: V) -> usize {
        assert!(
            !self.store[i].is_occupied(),
            "insert_searched: stale token, slot {i} was filled after the search"
        );
        if self.store[i].is_tombstone() {
            self.tombstones -= 1;
        }
        self.store.replace(i, Slot::Occupied { key, value });
        self.entries += 1;
        debug_assert!(self.entries + self.tombstones <= self.store.len());
        i
    }

    /// Remove the entry at `i`, returning the owned pair. Panics unless
    /// `i` refers to an occupied slot.
    ///
    /// Lazy deletion: the slot becomes a tombstone so probe chains passing
    /// through it keep working. Nothing is relocated; the bucket counts
    /// against capacity until the next growth sweeps it.
    pub fn erase(&mut self, i: usize) -> (K, V) {
        let _busy = self.busy.enter();
        assert!(self.store[i].is_occupied(), "erase: slot {i} is not occupied");
        let slot = self.store.replace(i, Slot::Tombstone);
        self.entries -= 1;
        self.tombstones += 1;
        match slot {
            Slot::Occupied { key, value } => (key, value),
            Slot::Empty | Slot::Tombstone => unreachable!(),
        }
    }

    /// Key at an occupied slot index. Panics otherwise.
    pub fn key(&self, i: usize) -> &K {
        let _busy = self.busy.enter();
        match &self.store[i] {
            Slot::Occupied { key, .. } => key,
            _ => panic!("key: slot {i} is not occupied"),
        }
    }

    /// Value at an occupied slot index. Panics otherwise.
    pub fn value(&self, i: usize) -> &V {
        let _busy = self.busy.enter();
        match &self.store[i] {
            Slot::Occupied { value, .. } => value,
            _ => panic!("value: slot {i} is not occupied"),
        }
    }

    /// Mutable value at an occupied slot index. Panics otherwise.
    pub fn value_mut(&mut self, i: usize) -> &mut V {
        let _busy = self.busy.enter();
        match &mut self.store[i] {
            Slot::Occupied { value, .. } => value,
            _ => panic!("value_mut: slot {i} is not occupied"),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.search(key) {
            SearchResult::Found(i) => Some(self.value(i)),
            SearchResult::NotFound(_) => None,
        }
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.search(key) {
            SearchResult::Found(i) => Some(self.value_mut(i)),
            SearchResult::NotFound(_) => None,
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.search(key).is_found()
    }

    /// Number of occupied entries (tombstones do not count).
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Slot-store length. A power of two, or zero before the first growth.
    pub fn capacity(&self) -> usize {
        self.store.len()
    }

    /// Grow so `n` entries fit under the post-growth load bound. Never
    /// shrinks; a target at or below the current capacity is a no-op.
    pub fn reserve(&mut self, n: usize) {
        let _busy = self.busy.enter();
        let target = Self::bucket_count(n);
        if target > self.store.len() {
            self.grow(target);
        }
    }

    /// Fraction of capacity in use. Panics on a zero-capacity table.
    pub fn load(&self) -> f64 {
        assert!(self.store.len() > 0, "load: table has no buckets");
        self.entries as f64 / self.store.len() as f64
    }

    /// Fraction of entries sitting at least one probe step past their home
    /// slot. A hash-quality and load-factor gauge, not a correctness
    /// property. Panics on an empty table.
    pub fn displaced(&self) -> f64 {
        let _busy = self.busy.enter();
        assert!(self.entries > 0, "displaced: table has no entries");
        let mask = self.store.len() - 1;
        let mut displaced = 0usize;
        for (i, slot) in self.store.slots().enumerate() {
            if let Slot::Occupied { key, .. } = slot {
                let home = ProbeSeq::new(self.hasher.hash_one(key), mask).index();
                if i != home {
                    displaced += 1;
                }
            }
        }
        displaced as f64 / self.entries as f64
    }

    /// Fraction of entries at least two probe steps past their home slot.
    /// Panics on an empty table.
    pub fn displaced_twice(&self) -> f64 {
        let _busy = self.busy.enter();
        assert!(self.entries > 0, "displaced_twice: table has no entries");
        let mask = self.store.len() - 1;
        let mut displaced = 0usize;
        for (i, slot) in self.store.slots().enumerate() {
            if let Slot::Occupied { key, .. } = slot {
                let mut probe = ProbeSeq::new(self.hasher.hash_one(key), mask);
                let home = probe.index();
                probe.move_next(mask);
                if i != home && i != probe.index() {
                    displaced += 1;
                }
            }
        }
        displaced as f64 / self.entries as f64
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.store.slots(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            slots: self.store.slots_mut(),
        }
    }

    /// Rebuild at `target` buckets (a power of two, at least the current
    /// capacity). Counters reset and every occupied slot reinserts through
    /// the normal probe path; tombstones do not survive. Outstanding slot
    /// indices and iterators are invalidated.
    fn grow(&mut self, target: usize) {
        debug_assert!(target.is_power_of_two());
        debug_assert!(target >= self.store.len());

        // Allocate before moving the old store aside, so an allocation
        // abort cannot leave the counters ahead of the slots.
        let fresh = SlotStore::with_buckets(target);
        let old = core::mem::replace(&mut self.store, fresh);
        self.entries = 0;
        self.tombstones = 0;

        for (key, value) in old.into_entries() {
            let i = match self.probe(&key) {
                SearchResult::NotFound(InsertSlot { index }) => {
                    index.expect("rehash target has room for every live entry")
                }
                SearchResult::Found(_) => unreachable!("rehash met a duplicate key"),
            };
            self.write_slot(i, key, value);
        }
    }

    /// Bucket count for `n` entries: the next power of two at or above
    /// 1.5 n + 1, so the table lands at a load factor of at most 2/3.
    fn bucket_count(n: usize) -> usize {
        if n == 0 {
            1
        } else {
            // ceil(1.5 n + 1) in integers.
            (3 * n / 2 + 1 + (n & 1)).next_power_of_two()
        }
    }
}

impl<K, V, S> fmt::Debug for OpenHashMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> FromIterator<(K, V)> for OpenHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    /// Build from a sequence of pairs. Panics on a duplicate key; the
    /// sequence is expected to be a set of bindings.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity_and_hasher(iter.size_hint().0, S::default());
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Forward iterator over `(&K, &V)` in store order, skipping empty and
/// tombstoned slots.
pub struct Iter<'a, K, V> {
    slots: slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.slots.next()? {
                Slot::Occupied { key, value } => return Some((key, value)),
                Slot::Empty | Slot::Tombstone => {}
            }
        }
    }
}

/// Forward iterator over `(&K, &mut V)`. Keys stay immutable; mutating a
/// key would desynchronize it from its probe position.
pub struct IterMut<'a, K, V> {
    slots: slice::IterMut<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.slots.next()? {
                Slot::Occupied { key, value } => return Some((&*key, value)),
                Slot::Empty | Slot::Tombstone => {}
            }
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a OpenHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut OpenHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
impl<K, V, S> OpenHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn counters(&self) -> (usize, usize) {
        (self.entries, self.tombstones)
    }

    pub(crate) fn tombstone_slots(&self) -> usize {
        self.store.slots().filter(|s| s.is_tombstone()).count()
    }
}

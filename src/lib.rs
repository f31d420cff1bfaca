//! oa-hashmap: an open-addressing hash map with triangular probing,
//! tombstone-based lazy deletion, and probe-quality introspection.
//!
//! Internal design:
//!
//! Summary
//! - Goal: keep the whole table in one contiguous slot store and make
//!   every policy (probing, deletion, growth) small enough to verify on
//!   its own.
//! - Layers:
//!   - `SlotStore<K, V>`: owned, power-of-two sequence of tagged slots
//!     (`Empty` / `Tombstone` / `Occupied`); the tag replaces the
//!     reserved-key-value trick so no key values are off limits.
//!   - `ProbeSeq`: triangular-number cursor; strides 1, 2, 3, ... visit
//!     every bucket exactly once per cycle on a power-of-two table.
//!   - `OpenHashMap<K, V, S>`: search / insert / erase / grow plus the
//!     `load` / `displaced` / `displaced_twice` gauges.
//!
//! Constraints
//! - Single-threaded: no atomics or locks; the embedded debug guard keeps
//!   the map `!Sync`. External serialization is the caller's job.
//! - `search` returns a tagged `SearchResult`; the miss case carries an
//!   opaque `InsertSlot` so insert does not re-probe.
//! - Duplicate keys, stale insert tokens, and out-of-state accessor or
//!   erase calls are precondition failures and panic; they are never
//!   recoverable errors.
//!
//! Deletion and growth policy
//! - `erase` drops a tombstone in place; probe chains through the bucket
//!   keep working and the next miss for a colliding key reclaims it.
//! - Growth targets the next power of two at or above 1.5 n + 1, so the
//!   post-growth load factor never exceeds 2/3 and insertion is amortized
//!   O(1). Rehash is the only compaction: tombstones never survive it.
//! - Growth invalidates all outstanding slot indices and iterators;
//!   `erase` invalidates only the erased position.
//!
//! Hasher seam
//! - Keys need `Eq + Hash`; the table takes any `BuildHasher` (default
//!   `RandomState`) and supports borrowed lookup via `Borrow<Q>`.
//!   `Hash`/`Eq` run during probing only; reentering the map from them is
//!   detected in debug builds.

mod open_hash_map;
mod open_hash_map_proptest;
mod probe;
mod reentrancy;
mod store;

// Public surface
pub use open_hash_map::{InsertSlot, Iter, IterMut, OpenHashMap, SearchResult};

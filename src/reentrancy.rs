//! Debug-time detection of nested entry into the map.
//!
//! Probing runs user `Eq`/`Hash` while counters and slots may be
//! mid-update; a key that sneaks back into the same map (via a
//! thread-local or a raw pointer) would observe that state. The check
//! panics on nested entry in debug builds and does nothing in release.

use core::cell::Cell;

/// Per-map busy flag. The `Cell` is present in every build profile so the
/// owning map is `!Sync` regardless of `debug_assertions`, matching the
/// single-threaded design.
#[derive(Debug, Default)]
pub(crate) struct ReentrancyCheck {
    busy: Cell<bool>,
}

impl ReentrancyCheck {
    pub(crate) const fn new() -> Self {
        Self {
            busy: Cell::new(false),
        }
    }

    /// Mark the map busy until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> BusyGuard {
        if cfg!(debug_assertions) {
            assert!(
                !self.busy.replace(true),
                "nested entry into OpenHashMap while it was mid-operation"
            );
        }
        BusyGuard { check: self }
    }
}

/// RAII guard returned by [`ReentrancyCheck::enter`].
///
/// Holds a raw pointer instead of a reference so the owning map can still
/// be borrowed mutably while the guard is live; every guard is created and
/// dropped inside a single map method, where the check it points at
/// outlives it.
pub(crate) struct BusyGuard {
    check: *const ReentrancyCheck,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if cfg!(debug_assertions) {
            // SAFETY: the guard never escapes the map operation that
            // created it, so the check is still alive here.
            unsafe { (*self.check).busy.set(false) };
        }
    }
}

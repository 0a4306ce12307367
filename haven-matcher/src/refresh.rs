//! Per-location mutual exclusion for characteristic refreshes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use haven_core::LocationId;

/// Arena of locks keyed by location.
///
/// At most one refresh per location runs at a time; refreshes for different
/// locations never contend beyond the brief arena lookup.
#[derive(Debug, Default)]
pub(crate) struct RefreshLocks {
    slots: Mutex<HashMap<LocationId, Arc<Mutex<()>>>>,
}

impl RefreshLocks {
    /// Lock handle for `id`, created on first use.
    pub(crate) fn slot(&self, id: LocationId) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(id).or_default())
    }

    /// Number of locations that have ever been refreshed.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Acquire a slot, tolerating a poisoned lock left by a panicked refresh.
pub(crate) fn hold(slot: &Mutex<()>) -> MutexGuard<'_, ()> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn same_location_shares_a_slot() {
        let locks = RefreshLocks::default();
        let first = locks.slot(LocationId(7));
        let second = locks.slot(LocationId(7));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &locks.slot(LocationId(8))));
        assert_eq!(locks.len(), 2);
    }

    #[rstest]
    fn held_slot_blocks_only_its_location() {
        let locks = RefreshLocks::default();
        let slot = locks.slot(LocationId(1));
        let _guard = hold(&slot);
        assert!(slot.try_lock().is_err());
        assert!(locks.slot(LocationId(2)).try_lock().is_ok());
    }
}

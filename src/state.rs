use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::allocation::{Allocation, AllotmentRecord};

/// Current room occupancy and per-group results, shared across requests.
///
/// The whole snapshot is swapped at once, so readers see either the
/// previous run or the new one.
#[derive(Debug, Default)]
pub struct AllocationState {
    snapshot: RwLock<Allocation>,
}

impl AllocationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&self, results: Vec<AllotmentRecord>, occupied_rooms: BTreeSet<u8>) {
        debug_assert_eq!(
            results.iter().filter(|r| r.assigned_room.is_some()).count(),
            occupied_rooms.len()
        );
        *self.write() = Allocation {
            records: results,
            occupied_rooms,
        };
    }

    pub fn reset(&self) {
        *self.write() = Allocation::default();
    }

    pub fn snapshot(&self) -> Allocation {
        self.read().clone()
    }

    pub fn results(&self) -> Vec<AllotmentRecord> {
        self.read().records.clone()
    }

    pub fn occupied_rooms(&self) -> BTreeSet<u8> {
        self.read().occupied_rooms.clone()
    }

    // Writers only assign complete snapshots, so a poisoned lock still holds consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Allocation> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Allocation> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

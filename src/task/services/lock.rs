//! Per-record mutation lock set.

use crate::task::domain::TaskId;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Set of task identifiers with a mutation in flight.
#[derive(Debug, Default)]
pub struct MutationLocks {
    in_flight: Mutex<HashSet<TaskId>>,
}

impl MutationLocks {
    /// Creates an empty lock set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as updating, or returns `None` when it already is.
    ///
    /// The mark is cleared when the returned guard drops.
    #[must_use]
    pub fn try_acquire(&self, id: TaskId) -> Option<MutationGuard<'_>> {
        let inserted = self.entries().insert(id);
        if !inserted {
            return None;
        }
        Some(MutationGuard { locks: self, id })
    }

    /// Reports whether a mutation on `id` is in flight.
    #[must_use]
    pub fn is_locked(&self, id: TaskId) -> bool {
        self.entries().contains(&id)
    }

    fn entries(&self) -> MutexGuard<'_, HashSet<TaskId>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held while a mutation on one task is in flight.
#[derive(Debug)]
pub struct MutationGuard<'a> {
    locks: &'a MutationLocks,
    id: TaskId,
}

impl MutationGuard<'_> {
    /// Returns the locked task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.locks.entries().remove(&self.id);
    }
}

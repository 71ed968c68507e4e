//! Aggregate task counts reported by the remote authority.

use super::{TaskPriority, TaskRecord, TaskStatus};
use serde::{Deserialize, Serialize};

/// Snapshot of task counts.
///
/// Counts always come from the remote authority; clients never derive them
/// from their local collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// Number of tasks.
    pub total: u64,
    /// Number of tasks in `todo`.
    pub todo: u64,
    /// Number of tasks in `in_progress`.
    pub in_progress: u64,
    /// Number of tasks in `done`.
    pub done: u64,
    /// Number of high-priority tasks.
    #[serde(default)]
    pub high_priority: u64,
    /// Number of medium-priority tasks.
    #[serde(default)]
    pub medium_priority: u64,
    /// Number of low-priority tasks.
    #[serde(default)]
    pub low_priority: u64,
}

impl TaskStats {
    /// Tallies a record set. Used by authority implementations.
    #[must_use]
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a TaskRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            match record.status() {
                Some(TaskStatus::Todo) => stats.todo += 1,
                Some(TaskStatus::InProgress) => stats.in_progress += 1,
                Some(TaskStatus::Done) => stats.done += 1,
                None => {}
            }
            match record.priority() {
                TaskPriority::High => stats.high_priority += 1,
                TaskPriority::Medium => stats.medium_priority += 1,
                TaskPriority::Low => stats.low_priority += 1,
            }
            stats
        })
    }

    /// Returns the count for one status.
    #[must_use]
    pub const fn count(&self, status: TaskStatus) -> u64 {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
        }
    }

    /// Reports whether `total` equals the sum of the per-status counts.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        match self.todo.checked_add(self.in_progress) {
            Some(partial) => match partial.checked_add(self.done) {
                Some(sum) => sum == self.total,
                None => false,
            },
            None => false,
        }
    }
}

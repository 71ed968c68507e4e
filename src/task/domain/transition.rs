//! Status cycle, action labels and bucket grouping.
//!
//! The cycle is `todo → in_progress → done → todo`. All functions take
//! `Option<TaskStatus>` because records decoded with an unknown status carry
//! `None`.

use super::{TaskRecord, TaskStatus};

/// Returns the status a task moves to when its action is triggered.
///
/// An unknown status restarts the cycle at [`TaskStatus::Todo`].
#[must_use]
pub const fn next_status(current: Option<TaskStatus>) -> TaskStatus {
    match current {
        Some(TaskStatus::Todo) => TaskStatus::InProgress,
        Some(TaskStatus::InProgress) => TaskStatus::Done,
        Some(TaskStatus::Done) | None => TaskStatus::Todo,
    }
}

/// Returns the label of the action that advances a task.
#[must_use]
pub const fn action_label(current: Option<TaskStatus>) -> &'static str {
    match current {
        Some(TaskStatus::Todo) => "Start",
        Some(TaskStatus::InProgress) => "Complete",
        Some(TaskStatus::Done) => "Reopen",
        None => "Update",
    }
}

/// Returns the display bucket for a status. Unknown statuses belong to no
/// bucket.
#[must_use]
pub const fn bucket_of(status: Option<TaskStatus>) -> Option<TaskStatus> {
    status
}

impl TaskStatus {
    /// Returns the next status in the cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        next_status(Some(self))
    }

    /// Returns the label of the action leaving this status.
    #[must_use]
    pub const fn action_label(self) -> &'static str {
        action_label(Some(self))
    }
}

/// Records grouped by status bucket, borrowed from a collection.
///
/// Each bucket keeps the order of the source collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBuckets<'a> {
    todo: Vec<&'a TaskRecord>,
    in_progress: Vec<&'a TaskRecord>,
    done: Vec<&'a TaskRecord>,
    excluded: usize,
}

impl<'a> TaskBuckets<'a> {
    /// Partitions records by [`bucket_of`] their status.
    #[must_use]
    pub fn partition(records: &'a [TaskRecord]) -> Self {
        let mut buckets = Self::default();
        for record in records {
            match bucket_of(record.status()) {
                Some(TaskStatus::Todo) => buckets.todo.push(record),
                Some(TaskStatus::InProgress) => buckets.in_progress.push(record),
                Some(TaskStatus::Done) => buckets.done.push(record),
                None => buckets.excluded += 1,
            }
        }
        buckets
    }

    /// Returns the records in one bucket.
    #[must_use]
    pub fn bucket(&self, status: TaskStatus) -> &[&'a TaskRecord] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    /// Iterates over buckets in display order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (TaskStatus, &[&'a TaskRecord])> + '_ {
        TaskStatus::ALL
            .into_iter()
            .map(move |status| (status, self.bucket(status)))
    }

    /// Number of records placed in a bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }

    /// Reports whether no record was placed in a bucket.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records left out because their status is unknown.
    #[must_use]
    pub const fn excluded(&self) -> usize {
        self.excluded
    }
}

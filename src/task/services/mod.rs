//! Application services for task synchronization.

mod classify;
mod lock;
mod requests;
mod sync;

pub use classify::{
    SyncError, SyncErrorKind, SyncFailure, SyncOperation, classify, classify_remote,
};
pub use lock::{MutationGuard, MutationLocks};
pub use requests::{CreateTaskRequest, UpdateTaskRequest};
pub use sync::{MutationOutcome, SyncResult, SyncSnapshot, SyncStatus, TaskSyncController};

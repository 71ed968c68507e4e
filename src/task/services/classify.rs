//! Failure classification applied at the controller boundary.

use crate::task::{
    domain::{TaskDomainError, TaskId, TaskStats},
    ports::RemoteError,
};
use std::fmt;
use thiserror::Error;

/// User-facing failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorKind {
    /// The remote authority rejected the identity token.
    Authentication,
    /// The request went out but no response came back.
    Network,
    /// The request payload was rejected.
    Validation,
    /// The targeted task does not exist.
    NotFound,
    /// Any other failure.
    Unknown,
}

impl SyncErrorKind {
    /// Returns the guidance shown to the user for this kind.
    #[must_use]
    pub const fn guidance(self) -> &'static str {
        match self {
            Self::Authentication => {
                "Authentication failed. Make sure you opened the app from its host entry point."
            }
            Self::Network => {
                "Cannot connect to server. Check your internet connection and API URL configuration."
            }
            Self::Validation => "The task details were rejected. Check them and try again.",
            Self::NotFound => "The task no longer exists. It may have been deleted.",
            Self::Unknown => "Please try again.",
        }
    }

    /// Returns a short name for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Network => "network",
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controller operations that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncOperation {
    /// Combined list and stats refresh.
    Fetch,
    /// Task creation.
    Create,
    /// Task update, including status changes.
    Update,
    /// Task deletion.
    Delete,
}

impl SyncOperation {
    /// Returns the sentence that opens a failure message.
    #[must_use]
    pub const fn failure_prefix(self) -> &'static str {
        match self {
            Self::Fetch => "Failed to load tasks.",
            Self::Create => "Failed to create task.",
            Self::Update => "Failed to update task.",
            Self::Delete => "Failed to delete task.",
        }
    }

    /// Returns a short name for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a [`SyncError`].
#[derive(Debug, Clone, Error)]
pub enum SyncFailure {
    /// The remote client failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The request failed domain validation before dispatch.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The task is not part of the local collection.
    #[error("task {0} is not in the local collection")]
    UnknownTask(TaskId),

    /// The stats snapshot does not add up.
    #[error("inconsistent stats snapshot: total {total} but per-status counts sum to {status_sum}")]
    InconsistentStats {
        /// Reported total.
        total: u64,
        /// Sum of the reported per-status counts.
        status_sum: u64,
    },

    /// The fetched collection lists an identifier twice.
    #[error("fetched collection contains task {0} more than once")]
    DuplicateTask(TaskId),
}

impl SyncFailure {
    /// Describes a stats snapshot whose total does not add up.
    #[must_use]
    pub const fn inconsistent_stats(stats: &TaskStats) -> Self {
        Self::InconsistentStats {
            total: stats.total,
            status_sum: stats
                .todo
                .saturating_add(stats.in_progress)
                .saturating_add(stats.done),
        }
    }
}

/// Maps a raw remote failure to its user-facing kind.
#[must_use]
pub const fn classify_remote(error: &RemoteError) -> SyncErrorKind {
    match error {
        RemoteError::Status { status, .. } => match *status {
            401 | 403 => SyncErrorKind::Authentication,
            400 | 422 => SyncErrorKind::Validation,
            404 => SyncErrorKind::NotFound,
            _ => SyncErrorKind::Unknown,
        },
        RemoteError::NoResponse(_) => SyncErrorKind::Network,
        RemoteError::Decode(_) | RemoteError::Request(_) => SyncErrorKind::Unknown,
    }
}

/// Maps any controller failure to its user-facing kind.
#[must_use]
pub const fn classify(failure: &SyncFailure) -> SyncErrorKind {
    match failure {
        SyncFailure::Remote(error) => classify_remote(error),
        SyncFailure::Domain(_) => SyncErrorKind::Validation,
        SyncFailure::UnknownTask(_) => SyncErrorKind::NotFound,
        SyncFailure::InconsistentStats { .. } | SyncFailure::DuplicateTask(_) => {
            SyncErrorKind::Unknown
        }
    }
}

/// Classified failure of a controller operation.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed ({kind}): {failure}")]
pub struct SyncError {
    operation: SyncOperation,
    kind: SyncErrorKind,
    #[source]
    failure: SyncFailure,
}

impl SyncError {
    /// Classifies `failure` for `operation`.
    #[must_use]
    pub fn new(operation: SyncOperation, cause: impl Into<SyncFailure>) -> Self {
        let failure = cause.into();
        Self {
            operation,
            kind: classify(&failure),
            failure,
        }
    }

    /// Returns the failed operation.
    #[must_use]
    pub const fn operation(&self) -> SyncOperation {
        self.operation
    }

    /// Returns the failure kind.
    #[must_use]
    pub const fn kind(&self) -> SyncErrorKind {
        self.kind
    }

    /// Returns the underlying failure.
    #[must_use]
    pub const fn failure(&self) -> &SyncFailure {
        &self.failure
    }

    /// Returns the message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!(
            "{} {}",
            self.operation.failure_prefix(),
            self.kind.guidance()
        )
    }
}

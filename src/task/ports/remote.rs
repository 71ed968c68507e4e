//! Remote authority port for task listing, mutation, and statistics.

use crate::task::domain::{NewTask, TaskFilter, TaskId, TaskPatch, TaskRecord, TaskStats};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote authority operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Authenticated request boundary to the remote authority.
///
/// Implementations report failures as raw [`RemoteError`] values; deciding
/// what a failure means for the user is left to the caller.
#[async_trait]
pub trait RemoteTaskClient: Send + Sync {
    /// Lists the tasks matching `filter`, newest first.
    ///
    /// Never mutates remote state.
    async fn list(&self, filter: &TaskFilter) -> RemoteResult<Vec<TaskRecord>>;

    /// Creates a task and returns it with its assigned identifier.
    async fn create(&self, task: &NewTask) -> RemoteResult<TaskRecord>;

    /// Applies a partial update and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns a `404` [`RemoteError::Status`] when the task does not exist.
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> RemoteResult<TaskRecord>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns a `404` [`RemoteError::Status`] when the task is already
    /// absent.
    async fn delete(&self, id: TaskId) -> RemoteResult<()>;

    /// Returns the authority's current aggregate counts.
    async fn stats(&self) -> RemoteResult<TaskStats>;
}

/// Remote operations, used for logging and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    /// `GET /api/tasks`.
    List,
    /// `POST /api/tasks`.
    Create,
    /// `PUT /api/tasks/{id}`.
    Update,
    /// `DELETE /api/tasks/{id}`.
    Delete,
    /// `GET /api/tasks/stats`.
    Stats,
}

impl RemoteOperation {
    /// Returns a short name for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Stats => "stats",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw failures surfaced by remote client implementations.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The authority answered with a non-success status.
    #[error("remote authority responded with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error detail reported by the authority.
        detail: Option<String>,
    },

    /// The request was dispatched but no response arrived.
    #[error("no response from remote authority: {0}")]
    NoResponse(Arc<dyn std::error::Error + Send + Sync>),

    /// A response arrived but its body could not be decoded.
    #[error("malformed response from remote authority: {0}")]
    Decode(Arc<dyn std::error::Error + Send + Sync>),

    /// The request could not be built.
    #[error("request could not be built: {0}")]
    Request(Arc<dyn std::error::Error + Send + Sync>),
}

impl RemoteError {
    /// Creates a status failure with a detail message.
    #[must_use]
    pub fn status(status: u16, detail: impl Into<String>) -> Self {
        Self::Status {
            status,
            detail: Some(detail.into()),
        }
    }

    /// Wraps a transport failure that left the request unanswered.
    #[must_use]
    pub fn no_response(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::NoResponse(Arc::new(err))
    }

    /// Wraps a response decoding failure.
    #[must_use]
    pub fn decode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode(Arc::new(err))
    }

    /// Wraps a request construction failure.
    #[must_use]
    pub fn request(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Request(Arc::new(err))
    }

    /// Returns the HTTP status when the authority answered.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NoResponse(_) | Self::Decode(_) | Self::Request(_) => None,
        }
    }
}

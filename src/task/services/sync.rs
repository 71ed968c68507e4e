//! Synchronization controller reconciling local view state with the remote
//! authority.
//!
//! The controller never patches its collection locally. Every successful
//! mutation is followed by a full refresh of tasks and stats, so the local
//! view is always a snapshot the remote authority actually held.

use super::{
    CreateTaskRequest, MutationLocks, SyncError, SyncFailure, SyncOperation, UpdateTaskRequest,
};
use crate::task::{
    domain::{
        TaskBuckets, TaskFilter, TaskId, TaskRecord, TaskStats, TaskStatus, next_status,
    },
    ports::{FeedbackSignal, HostContext, RemoteResult, RemoteTaskClient},
};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Result type for controller operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Loading state of the controller.
#[derive(Debug, Clone, Default)]
pub enum SyncStatus {
    /// No fetch has been attempted yet.
    #[default]
    Idle,
    /// A refresh is in flight.
    Loading,
    /// The latest refresh succeeded.
    Ready,
    /// The latest refresh failed.
    Failed(SyncError),
}

impl SyncStatus {
    /// Reports whether a refresh is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Reports whether the latest refresh succeeded.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns the error of a failed refresh.
    #[must_use]
    pub const fn error(&self) -> Option<&SyncError> {
        match self {
            Self::Failed(error) => Some(error),
            Self::Idle | Self::Loading | Self::Ready => None,
        }
    }
}

/// Result of a mutation request on an existing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The mutation was dispatched, accepted, and followed by a refresh.
    Applied,
    /// Another mutation on the same task was in flight; nothing was sent.
    Skipped,
}

/// Consistent view of the controller's state.
#[derive(Debug, Clone, Default)]
pub struct SyncSnapshot {
    status: SyncStatus,
    tasks: Vec<TaskRecord>,
    stats: Option<TaskStats>,
}

impl SyncSnapshot {
    /// Returns the loading state.
    #[must_use]
    pub const fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// Returns the tasks from the last successful refresh.
    #[must_use]
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// Returns the stats from the last successful refresh.
    #[must_use]
    pub const fn stats(&self) -> Option<TaskStats> {
        self.stats
    }

    /// Looks up a task by identifier.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Groups the tasks by status bucket.
    #[must_use]
    pub fn buckets(&self) -> TaskBuckets<'_> {
        TaskBuckets::partition(&self.tasks)
    }
}

#[derive(Debug, Default)]
struct SyncState {
    snapshot: SyncSnapshot,
    requested_generation: u64,
    settled_generation: u64,
}

enum Refresh {
    Ready(Vec<TaskRecord>, TaskStats),
    Failed(SyncError),
}

/// Orchestrates fetches and mutations against the remote authority and owns
/// the authoritative local task collection.
pub struct TaskSyncController<R, H>
where
    R: RemoteTaskClient,
    H: HostContext,
{
    remote: Arc<R>,
    host: Arc<H>,
    state: RwLock<SyncState>,
    locks: MutationLocks,
}

impl<R, H> TaskSyncController<R, H>
where
    R: RemoteTaskClient,
    H: HostContext,
{
    /// Creates an idle controller with an empty collection.
    #[must_use]
    pub fn new(remote: Arc<R>, host: Arc<H>) -> Self {
        Self {
            remote,
            host,
            state: RwLock::new(SyncState::default()),
            locks: MutationLocks::new(),
        }
    }

    /// Returns a consistent copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> SyncSnapshot {
        self.read_state().snapshot.clone()
    }

    /// Returns the tasks from the last successful refresh.
    #[must_use]
    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.read_state().snapshot.tasks.clone()
    }

    /// Returns the stats from the last successful refresh.
    #[must_use]
    pub fn stats(&self) -> Option<TaskStats> {
        self.read_state().snapshot.stats
    }

    /// Returns the loading state.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.read_state().snapshot.status.clone()
    }

    /// Reports whether a refresh is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read_state().snapshot.status.is_loading()
    }

    /// Returns the error of the latest refresh, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<SyncError> {
        self.read_state().snapshot.status.error().cloned()
    }

    /// Reports whether a mutation on `id` is in flight.
    #[must_use]
    pub fn is_updating(&self, id: TaskId) -> bool {
        self.locks.is_locked(id)
    }

    /// Refreshes tasks and stats together. Also serves as the retry action
    /// after a failed fetch.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncOperation::Fetch`] error when either request fails or
    /// the snapshot is inconsistent. The controller then reports
    /// [`SyncStatus::Failed`] and keeps the previous collection.
    pub async fn fetch_all(&self) -> SyncResult<()> {
        let generation = self.begin_refresh();
        tracing::debug!(generation, "refreshing tasks and stats");

        let filter = TaskFilter::all();
        let (listed, counted) = tokio::join!(self.remote.list(&filter), self.remote.stats());

        match verify_snapshot(listed, counted) {
            Ok((tasks, stats)) => {
                tracing::debug!(generation, tasks = tasks.len(), "refresh succeeded");
                self.settle(generation, Refresh::Ready(tasks, stats));
                Ok(())
            }
            Err(failure) => {
                let error = SyncError::new(SyncOperation::Fetch, failure);
                tracing::warn!(
                    generation,
                    kind = %error.kind(),
                    error = %error.failure(),
                    "refresh failed"
                );
                self.settle(generation, Refresh::Failed(error.clone()));
                self.host.notify(&error.user_message());
                Err(error)
            }
        }
    }

    /// Creates a task, then refreshes.
    ///
    /// Returns the record as created by the remote authority.
    ///
    /// # Errors
    ///
    /// Returns a classified error when validation, the remote call, or the
    /// follow-up refresh fails. A failed create leaves the state untouched.
    pub async fn create(&self, request: CreateTaskRequest) -> SyncResult<TaskRecord> {
        let task = request
            .into_new_task()
            .map_err(|err| self.reject(SyncOperation::Create, err))?;
        let created = self
            .dispatch(SyncOperation::Create, self.remote.create(&task))
            .await?;
        tracing::info!(task_id = %created.id(), "task created");
        self.fetch_all().await?;
        Ok(created)
    }

    /// Applies a partial update, then refreshes.
    ///
    /// Returns [`MutationOutcome::Skipped`] without contacting the remote
    /// authority when a mutation on the same task is already in flight.
    ///
    /// # Errors
    ///
    /// Returns a classified error when validation, the remote call, or the
    /// follow-up refresh fails.
    pub async fn update(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> SyncResult<MutationOutcome> {
        let Some(_guard) = self.locks.try_acquire(id) else {
            tracing::debug!(task_id = %id, "mutation already in flight, ignoring update");
            return Ok(MutationOutcome::Skipped);
        };
        let patch = request
            .into_patch()
            .map_err(|err| self.reject(SyncOperation::Update, err))?;
        self.dispatch(SyncOperation::Update, self.remote.update(id, &patch))
            .await?;
        tracing::info!(task_id = %id, "task updated");
        self.fetch_all().await?;
        Ok(MutationOutcome::Applied)
    }

    /// Moves a task to `status`.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> SyncResult<MutationOutcome> {
        self.update(id, UpdateTaskRequest::new().with_status(status))
            .await
    }

    /// Moves a task to the next status in the cycle, based on its status in
    /// the local collection.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncFailure::UnknownTask`] error when the task is not in
    /// the local collection, otherwise see [`update`](Self::update).
    pub async fn advance(&self, id: TaskId) -> SyncResult<MutationOutcome> {
        let known = self.read_state().snapshot.task(id).map(TaskRecord::status);
        let Some(current) = known else {
            return Err(self.reject(SyncOperation::Update, SyncFailure::UnknownTask(id)));
        };
        self.update_status(id, next_status(current)).await
    }

    /// Deletes a task, then refreshes.
    ///
    /// Returns [`MutationOutcome::Skipped`] without contacting the remote
    /// authority when a mutation on the same task is already in flight.
    ///
    /// # Errors
    ///
    /// Returns a classified error when the remote call or the follow-up
    /// refresh fails.
    pub async fn delete(&self, id: TaskId) -> SyncResult<MutationOutcome> {
        let Some(_guard) = self.locks.try_acquire(id) else {
            tracing::debug!(task_id = %id, "mutation already in flight, ignoring delete");
            return Ok(MutationOutcome::Skipped);
        };
        self.dispatch(SyncOperation::Delete, self.remote.delete(id))
            .await?;
        tracing::info!(task_id = %id, "task deleted");
        self.fetch_all().await?;
        Ok(MutationOutcome::Applied)
    }

    async fn dispatch<T>(
        &self,
        operation: SyncOperation,
        request: impl Future<Output = RemoteResult<T>> + Send,
    ) -> SyncResult<T> {
        match request.await {
            Ok(value) => {
                self.host.signal(FeedbackSignal::Success);
                Ok(value)
            }
            Err(err) => Err(self.reject(operation, err)),
        }
    }

    /// Classifies a mutation failure and reports it to the host.
    fn reject(&self, operation: SyncOperation, cause: impl Into<SyncFailure>) -> SyncError {
        let error = SyncError::new(operation, cause);
        tracing::warn!(
            %operation,
            kind = %error.kind(),
            error = %error.failure(),
            "mutation failed"
        );
        self.host.notify(&error.user_message());
        self.host.signal(FeedbackSignal::Failure);
        error
    }

    fn begin_refresh(&self) -> u64 {
        let mut state = self.write_state();
        state.requested_generation += 1;
        state.snapshot.status = SyncStatus::Loading;
        state.requested_generation
    }

    /// Stores a refresh result unless a newer one already landed.
    fn settle(&self, generation: u64, refresh: Refresh) {
        let mut state = self.write_state();
        if generation <= state.settled_generation {
            tracing::warn!(
                generation,
                settled = state.settled_generation,
                "discarding stale refresh"
            );
            return;
        }
        state.settled_generation = generation;
        let latest = generation == state.requested_generation;
        match refresh {
            Refresh::Ready(tasks, stats) => {
                state.snapshot.tasks = tasks;
                state.snapshot.stats = Some(stats);
                if latest {
                    state.snapshot.status = SyncStatus::Ready;
                }
            }
            Refresh::Failed(error) => {
                if latest {
                    state.snapshot.status = SyncStatus::Failed(error);
                }
            }
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SyncState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SyncState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Checks that a fetched collection and stats snapshot can be trusted.
fn verify_snapshot(
    listed: RemoteResult<Vec<TaskRecord>>,
    counted: RemoteResult<TaskStats>,
) -> Result<(Vec<TaskRecord>, TaskStats), SyncFailure> {
    let tasks = listed?;
    let stats = counted?;
    if !stats.is_consistent() {
        return Err(SyncFailure::inconsistent_stats(&stats));
    }
    let mut seen = HashSet::with_capacity(tasks.len());
    if let Some(duplicate) = tasks.iter().map(TaskRecord::id).find(|id| !seen.insert(*id)) {
        return Err(SyncFailure::DuplicateTask(duplicate));
    }
    Ok((tasks, stats))
}

//! Shared world state for task synchronization BDD scenarios.

use std::sync::Arc;

use rstest::fixture;
use tasksync::task::{
    adapters::{RecordingHostContext, memory::InMemoryTaskAuthority},
    domain::TaskId,
    services::{MutationOutcome, SyncError, SyncResult, TaskSyncController},
};
use tokio::task::JoinHandle;

/// Controller type used by the BDD world.
pub type TestController = TaskSyncController<InMemoryTaskAuthority, RecordingHostContext>;

/// Scenario world for task synchronization behaviour tests.
pub struct TaskSyncWorld {
    pub authority: InMemoryTaskAuthority,
    pub host: Arc<RecordingHostContext>,
    pub controller: Arc<TestController>,
    pub pending_mutation: Option<JoinHandle<SyncResult<MutationOutcome>>>,
    pub repeated_outcome: Option<MutationOutcome>,
    pub last_error: Option<SyncError>,
}

impl TaskSyncWorld {
    /// Creates a world around an empty in-memory task service.
    #[must_use]
    pub fn new() -> Self {
        let authority = InMemoryTaskAuthority::new();
        let host = Arc::new(RecordingHostContext::with_token("scenario-identity"));
        let controller = Arc::new(TaskSyncController::new(
            Arc::new(authority.clone()),
            Arc::clone(&host),
        ));

        Self {
            authority,
            host,
            controller,
            pending_mutation: None,
            repeated_outcome: None,
            last_error: None,
        }
    }

    /// Records the error of a failed controller call.
    pub fn record<T>(&mut self, result: SyncResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.last_error = Some(err);
                None
            }
        }
    }
}

impl Default for TaskSyncWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskSyncWorld {
    TaskSyncWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a task identifier written in a scenario.
///
/// # Errors
///
/// Returns an error if the identifier is not positive.
pub fn task_id(value: i64) -> Result<TaskId, eyre::Report> {
    TaskId::new(value).map_err(|err| eyre::eyre!("invalid task id in scenario: {err}"))
}

//! In-memory remote authority for synchronization tests and demos.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

use crate::task::{
    domain::{
        NewTask, TaskFilter, TaskId, TaskPatch, TaskRecord, TaskRecordData, TaskStats, TaskStatus,
    },
    ports::{RemoteError, RemoteOperation, RemoteResult, RemoteTaskClient},
};

/// One request received by the in-memory authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteCall {
    /// Requested operation.
    pub operation: RemoteOperation,
    /// Targeted task, for update and delete.
    pub task_id: Option<TaskId>,
}

impl RemoteCall {
    const fn collection(operation: RemoteOperation) -> Self {
        Self {
            operation,
            task_id: None,
        }
    }

    const fn targeted(operation: RemoteOperation, task_id: TaskId) -> Self {
        Self {
            operation,
            task_id: Some(task_id),
        }
    }
}

/// Thread-safe in-memory remote authority.
///
/// Behaves like the HTTP task service: it assigns sequential identifiers,
/// defaults new tasks to `todo`, lists newest first, and answers unknown
/// identifiers with `404`. It also records every call and supports fault
/// injection and holding mutations in flight.
pub struct InMemoryTaskAuthority<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<AuthorityState>>,
    gate: Arc<watch::Sender<bool>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct AuthorityState {
    records: BTreeMap<TaskId, TaskRecord>,
    last_id: i64,
    calls: Vec<RemoteCall>,
    faults: HashMap<RemoteOperation, VecDeque<RemoteError>>,
}

impl InMemoryTaskAuthority<DefaultClock> {
    /// Creates an empty authority using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryTaskAuthority<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for InMemoryTaskAuthority<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            gate: Arc::clone(&self.gate),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> InMemoryTaskAuthority<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty authority stamping records with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            state: Arc::new(RwLock::new(AuthorityState::default())),
            gate: Arc::new(gate),
            clock,
        }
    }

    /// Inserts a task without recording a call.
    ///
    /// # Errors
    ///
    /// Returns a `500` status when the authority state is unavailable.
    pub fn seed(&self, task: &NewTask) -> RemoteResult<TaskRecord> {
        let mut state = self.write()?;
        insert_task(&mut state, task, &*self.clock)
    }

    /// Changes a task as another actor would, without recording a call.
    ///
    /// # Errors
    ///
    /// Returns a `404` status when the task does not exist.
    pub fn apply_external(&self, id: TaskId, patch: &TaskPatch) -> RemoteResult<TaskRecord> {
        let mut state = self.write()?;
        patch_task(&mut state, id, patch, &*self.clock)
    }

    /// Queues `error` as the result of the next call to `operation`.
    ///
    /// # Errors
    ///
    /// Returns a `500` status when the authority state is unavailable.
    pub fn fail_next(&self, operation: RemoteOperation, error: RemoteError) -> RemoteResult<()> {
        let mut state = self.write()?;
        state.faults.entry(operation).or_default().push_back(error);
        Ok(())
    }

    /// Parks create, update and delete calls until
    /// [`release_mutations`](Self::release_mutations) is called.
    ///
    /// Parked calls are recorded before they wait.
    pub fn hold_mutations(&self) {
        self.gate.send_replace(true);
    }

    /// Lets parked and future mutations proceed.
    pub fn release_mutations(&self) {
        self.gate.send_replace(false);
    }

    /// Returns every call received so far, in arrival order.
    ///
    /// # Errors
    ///
    /// Returns a `500` status when the authority state is unavailable.
    pub fn calls(&self) -> RemoteResult<Vec<RemoteCall>> {
        Ok(self.read()?.calls.clone())
    }

    /// Counts the calls received for one operation.
    ///
    /// # Errors
    ///
    /// Returns a `500` status when the authority state is unavailable.
    pub fn call_count(&self, operation: RemoteOperation) -> RemoteResult<usize> {
        Ok(self
            .read()?
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .count())
    }

    /// Returns the stored records, newest first.
    ///
    /// # Errors
    ///
    /// Returns a `500` status when the authority state is unavailable.
    pub fn records(&self) -> RemoteResult<Vec<TaskRecord>> {
        Ok(sorted_matching(&*self.read()?, &TaskFilter::all()))
    }

    fn read(&self) -> RemoteResult<RwLockReadGuard<'_, AuthorityState>> {
        self.state
            .read()
            .map_err(|err| RemoteError::status(500, format!("authority state unavailable: {err}")))
    }

    fn write(&self) -> RemoteResult<RwLockWriteGuard<'_, AuthorityState>> {
        self.state
            .write()
            .map_err(|err| RemoteError::status(500, format!("authority state unavailable: {err}")))
    }

    /// Records a call and pops any fault queued for it.
    fn receive(&self, call: RemoteCall) -> RemoteResult<()> {
        let mut state = self.write()?;
        state.calls.push(call);
        match state
            .faults
            .get_mut(&call.operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn pass_gate(&self) -> RemoteResult<()> {
        let mut gate = self.gate.subscribe();
        gate.wait_for(|held| !*held)
            .await
            .map(drop)
            .map_err(RemoteError::no_response)
    }
}

fn insert_task(
    state: &mut AuthorityState,
    task: &NewTask,
    clock: &impl Clock,
) -> RemoteResult<TaskRecord> {
    let next = state.last_id + 1;
    let id = TaskId::new(next).map_err(|err| RemoteError::status(500, err.to_string()))?;
    let created_at = clock.utc();
    let record = TaskRecord::from_data(TaskRecordData {
        id,
        title: task.title().clone(),
        description: task.description().map(str::to_owned),
        status: task.status().unwrap_or(TaskStatus::Todo),
        priority: task.priority().unwrap_or_default(),
        deadline: task.deadline(),
        created_at,
        updated_at: Some(created_at),
    });
    state.last_id = next;
    state.records.insert(id, record.clone());
    Ok(record)
}

fn patch_task(
    state: &mut AuthorityState,
    id: TaskId,
    patch: &TaskPatch,
    clock: &impl Clock,
) -> RemoteResult<TaskRecord> {
    let record = state
        .records
        .get_mut(&id)
        .ok_or_else(|| RemoteError::status(404, "Task not found"))?;
    record.apply_patch(patch, clock.utc());
    Ok(record.clone())
}

fn sorted_matching(state: &AuthorityState, filter: &TaskFilter) -> Vec<TaskRecord> {
    let mut records: Vec<TaskRecord> = state
        .records
        .values()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect();
    records.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id()))
    });
    records
}

#[async_trait]
impl<C> RemoteTaskClient for InMemoryTaskAuthority<C>
where
    C: Clock + Send + Sync,
{
    async fn list(&self, filter: &TaskFilter) -> RemoteResult<Vec<TaskRecord>> {
        self.receive(RemoteCall::collection(RemoteOperation::List))?;
        Ok(sorted_matching(&*self.read()?, filter))
    }

    async fn create(&self, task: &NewTask) -> RemoteResult<TaskRecord> {
        self.receive(RemoteCall::collection(RemoteOperation::Create))?;
        self.pass_gate().await?;
        let mut state = self.write()?;
        insert_task(&mut state, task, &*self.clock)
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> RemoteResult<TaskRecord> {
        self.receive(RemoteCall::targeted(RemoteOperation::Update, id))?;
        self.pass_gate().await?;
        let mut state = self.write()?;
        patch_task(&mut state, id, patch, &*self.clock)
    }

    async fn delete(&self, id: TaskId) -> RemoteResult<()> {
        self.receive(RemoteCall::targeted(RemoteOperation::Delete, id))?;
        self.pass_gate().await?;
        let mut state = self.write()?;
        state
            .records
            .remove(&id)
            .map(drop)
            .ok_or_else(|| RemoteError::status(404, "Task not found"))
    }

    async fn stats(&self) -> RemoteResult<TaskStats> {
        self.receive(RemoteCall::collection(RemoteOperation::Stats))?;
        Ok(TaskStats::tally(self.read()?.records.values()))
    }
}

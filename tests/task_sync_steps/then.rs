//! Then steps for task synchronization BDD scenarios.

use super::world::{TaskSyncWorld, task_id};
use rstest_bdd_macros::then;
use tasksync::task::{
    domain::{TaskStatus, action_label},
    ports::RemoteOperation,
    services::MutationOutcome,
};

#[then("the collection holds {count:usize} task")]
fn collection_holds(world: &TaskSyncWorld, count: usize) -> Result<(), eyre::Report> {
    let found = world.controller.tasks().len();
    if found != count {
        return Err(eyre::eyre!("expected {count} tasks, found {found}"));
    }
    Ok(())
}

#[then(r#"task {id:i64} has status "{status}""#)]
fn task_has_status(world: &TaskSyncWorld, id: i64, status: String) -> Result<(), eyre::Report> {
    let expected = status
        .parse::<TaskStatus>()
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let snapshot = world.controller.snapshot();
    let task = snapshot
        .task(task_id(id)?)
        .ok_or_else(|| eyre::eyre!("task {id} missing from the collection"))?;

    if task.status() != Some(expected) {
        return Err(eyre::eyre!(
            "expected status {}, found {:?}",
            expected.as_str(),
            task.status()
        ));
    }
    Ok(())
}

#[then("the stats report {total:u64} total and {todo:u64} todo")]
fn stats_report(world: &TaskSyncWorld, total: u64, todo: u64) -> Result<(), eyre::Report> {
    let stats = world
        .controller
        .stats()
        .ok_or_else(|| eyre::eyre!("stats were never loaded"))?;
    eyre::ensure!(
        stats.total == total && stats.todo == todo,
        "unexpected stats {stats:?}"
    );
    Ok(())
}

#[then(r#"the action offered for task {id:i64} is "{label}""#)]
fn action_offered(world: &TaskSyncWorld, id: i64, label: String) -> Result<(), eyre::Report> {
    let snapshot = world.controller.snapshot();
    let task = snapshot
        .task(task_id(id)?)
        .ok_or_else(|| eyre::eyre!("task {id} missing from the collection"))?;
    let offered = action_label(task.status());
    eyre::ensure!(offered == label, "expected action {label}, found {offered}");
    Ok(())
}

#[then("the repeated update is skipped")]
fn repeated_update_skipped(world: &TaskSyncWorld) -> Result<(), eyre::Report> {
    match world.repeated_outcome {
        Some(MutationOutcome::Skipped) => Ok(()),
        other => Err(eyre::eyre!("expected a skipped update, got {other:?}")),
    }
}

#[then("the task service received {count:usize} update request")]
fn service_received_updates(world: &TaskSyncWorld, count: usize) -> Result<(), eyre::Report> {
    let received = world
        .authority
        .call_count(RemoteOperation::Update)
        .map_err(|err| eyre::eyre!("call log unavailable: {err}"))?;
    eyre::ensure!(
        received == count,
        "expected {count} update requests, saw {received}"
    );
    Ok(())
}

#[then(r#"the last operation failed with a "{kind}" error"#)]
fn last_operation_failed(world: &TaskSyncWorld, kind: String) -> Result<(), eyre::Report> {
    let error = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no operation failed"))?;
    eyre::ensure!(
        error.kind().as_str() == kind,
        "expected a {kind} error, got {}",
        error.kind()
    );
    Ok(())
}

#[then(r#"the user was notified "{message}""#)]
fn user_notified(world: &TaskSyncWorld, message: String) -> Result<(), eyre::Report> {
    let notifications = world.host.notifications();
    eyre::ensure!(
        notifications.contains(&message),
        "notification missing, saw {notifications:?}"
    );
    Ok(())
}

#[then("the controller reports a failed refresh")]
fn controller_reports_failure(world: &TaskSyncWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        world.controller.error().is_some(),
        "controller status is {:?}",
        world.controller.status()
    );
    Ok(())
}

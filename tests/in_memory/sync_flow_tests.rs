//! In-memory integration tests for create, update, delete and refresh flows.

use super::helpers::{SyncFixture, harness};
use rstest::rstest;
use tasksync::task::{
    domain::{TaskId, TaskPriority, TaskStats, TaskStatus},
    ports::{FeedbackSignal, RemoteError, RemoteOperation, RemoteTaskClient},
    services::{
        CreateTaskRequest, MutationOutcome, SyncErrorKind, SyncOperation, SyncStatus,
        UpdateTaskRequest,
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_appears_with_authority_assigned_identity(
    harness: SyncFixture,
) -> eyre::Result<()> {
    let created = harness
        .controller
        .create(CreateTaskRequest::new("Buy milk"))
        .await?;

    eyre::ensure!(created.id() == TaskId::new(1)?, "unexpected id {}", created.id());
    let tasks = harness.controller.tasks();
    eyre::ensure!(tasks.len() == 1, "expected one task, found {}", tasks.len());
    let task = tasks
        .first()
        .ok_or_else(|| eyre::eyre!("expected one task"))?;
    eyre::ensure!(task.id() == created.id(), "task id mismatch");
    eyre::ensure!(task.status() == Some(TaskStatus::Todo), "new task is not todo");

    let stats = harness
        .controller
        .stats()
        .ok_or_else(|| eyre::eyre!("stats missing after create"))?;
    eyre::ensure!(
        (stats.total, stats.todo, stats.in_progress, stats.done) == (1, 1, 0, 0),
        "unexpected stats {stats:?}"
    );
    eyre::ensure!(stats.medium_priority == 1, "priority default not applied");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_of_missing_task_leaves_state_unchanged(harness: SyncFixture) -> eyre::Result<()> {
    harness.seed("Buy milk", TaskStatus::Todo)?;
    harness.controller.fetch_all().await?;
    let before = harness.controller.snapshot();

    let missing = TaskId::new(42)?;
    let error = harness
        .controller
        .delete(missing)
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("delete of a missing task succeeded"))?;

    eyre::ensure!(error.kind() == SyncErrorKind::NotFound, "kind was {}", error.kind());
    eyre::ensure!(error.operation() == SyncOperation::Delete, "wrong operation");
    let after = harness.controller.snapshot();
    eyre::ensure!(after.tasks() == before.tasks(), "collection changed");
    eyre::ensure!(after.stats() == before.stats(), "stats changed");
    let notifications = harness.host.notifications();
    eyre::ensure!(
        notifications
            == vec!["Failed to delete task. The task no longer exists. It may have been deleted."],
        "unexpected notifications {notifications:?}"
    );
    eyre::ensure!(
        harness.host.signals() == vec![FeedbackSignal::Failure],
        "failure signal missing"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unanswered_fetch_is_a_network_failure_and_retry_recovers(
    harness: SyncFixture,
) -> eyre::Result<()> {
    harness.seed("Buy milk", TaskStatus::Todo)?;
    let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    harness.authority
        .fail_next(RemoteOperation::List, RemoteError::no_response(refused))?;

    let outcome = harness.controller.fetch_all().await;

    let error = outcome
        .err()
        .ok_or_else(|| eyre::eyre!("fetch unexpectedly succeeded"))?;
    eyre::ensure!(error.kind() == SyncErrorKind::Network, "kind was {}", error.kind());
    eyre::ensure!(
        matches!(harness.controller.status(), SyncStatus::Failed(ref failed) if failed.kind() == SyncErrorKind::Network),
        "controller status is not a network failure"
    );
    eyre::ensure!(
        error.user_message()
            == "Failed to load tasks. Cannot connect to server. Check your internet connection and API URL configuration.",
        "unexpected message {}",
        error.user_message()
    );

    harness.controller.fetch_all().await?;

    eyre::ensure!(harness.controller.status().is_ready(), "retry did not recover");
    eyre::ensure!(harness.controller.tasks().len() == 1, "retry did not load tasks");
    eyre::ensure!(harness.calls(RemoteOperation::List)? == 2, "expected two list calls");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn buckets_group_tasks_in_listing_order(harness: SyncFixture) -> eyre::Result<()> {
    let first = harness.seed("First", TaskStatus::Todo)?;
    harness.seed("Second", TaskStatus::Done)?;
    let third = harness.seed("Third", TaskStatus::Todo)?;
    harness.seed("Fourth", TaskStatus::InProgress)?;
    harness.controller.fetch_all().await?;

    let snapshot = harness.controller.snapshot();
    let buckets = snapshot.buckets();
    let todo: Vec<TaskId> = buckets
        .bucket(TaskStatus::Todo)
        .iter()
        .map(|task| task.id())
        .collect();

    eyre::ensure!(todo == vec![third.id(), first.id()], "todo order was {todo:?}");
    eyre::ensure!(
        buckets.bucket(TaskStatus::InProgress).len() == 1,
        "in-progress bucket size"
    );
    eyre::ensure!(buckets.bucket(TaskStatus::Done).len() == 1, "done bucket size");
    let stats = snapshot
        .stats()
        .ok_or_else(|| eyre::eyre!("stats missing"))?;
    for status in TaskStatus::ALL {
        let bucket_len = u64::try_from(buckets.bucket(status).len())?;
        eyre::ensure!(stats.count(status) == bucket_len, "{status} count mismatch");
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_through_the_cycle_and_deletion(harness: SyncFixture) -> eyre::Result<()> {
    let created = harness
        .controller
        .create(
            CreateTaskRequest::new("Ship release")
                .with_description("Tag and publish")
                .with_priority(TaskPriority::High),
        )
        .await?;
    let id = created.id();

    for expected in [TaskStatus::InProgress, TaskStatus::Done] {
        let outcome = harness.controller.advance(id).await?;
        eyre::ensure!(outcome == MutationOutcome::Applied, "advance skipped");
        let status = harness
            .controller
            .snapshot()
            .task(id)
            .and_then(|task| task.status());
        eyre::ensure!(status == Some(expected), "expected {expected}, found {status:?}");
    }

    harness.controller
        .update(id, UpdateTaskRequest::new().clear_description())
        .await?;
    let description = harness
        .controller
        .snapshot()
        .task(id)
        .map(|task| task.description().map(str::to_owned));
    eyre::ensure!(description == Some(None), "description not cleared");

    harness.controller.delete(id).await?;

    eyre::ensure!(harness.controller.tasks().is_empty(), "task not removed");
    eyre::ensure!(
        harness.controller.stats() == Some(TaskStats::default()),
        "stats not reset"
    );
    eyre::ensure!(
        harness.host.signals().iter().all(|signal| *signal == FeedbackSignal::Success),
        "unexpected failure signal"
    );
    eyre::ensure!(harness.host.notifications().is_empty(), "unexpected notification");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn external_change_between_refreshes_is_authoritative(
    harness: SyncFixture,
) -> eyre::Result<()> {
    let task = harness.seed("Shared task", TaskStatus::Todo)?;
    harness.controller.fetch_all().await?;
    let other = harness.seed("Added elsewhere", TaskStatus::Done)?;

    harness.controller
        .update_status(task.id(), TaskStatus::InProgress)
        .await?;

    let snapshot = harness.controller.snapshot();
    eyre::ensure!(snapshot.task(other.id()).is_some(), "external create missing");
    eyre::ensure!(snapshot.tasks().len() == 2, "unexpected collection size");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn authority_serves_filtered_listings(harness: SyncFixture) -> eyre::Result<()> {
    harness.seed("Todo", TaskStatus::Todo)?;
    harness.seed("Done", TaskStatus::Done)?;

    let filter = tasksync::task::domain::TaskFilter::all().with_status(TaskStatus::Done);
    let listed = harness.authority.list(&filter).await?;

    eyre::ensure!(listed.len() == 1, "filter returned {} tasks", listed.len());
    eyre::ensure!(
        listed.iter().all(|task| task.status() == Some(TaskStatus::Done)),
        "filter leaked other statuses"
    );
    Ok(())
}

async fn ensure_matches_fresh_fetch(harness: &SyncFixture, step: &str) -> eyre::Result<()> {
    let tasks = harness.controller.tasks();
    let stats = harness.controller.stats();
    harness.controller.fetch_all().await?;
    eyre::ensure!(
        harness.controller.tasks() == tasks,
        "collection after {step} differs from a fresh fetch"
    );
    eyre::ensure!(
        harness.controller.stats() == stats,
        "stats after {step} differ from a fresh fetch"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn state_after_each_mutation_matches_a_fresh_fetch(
    harness: SyncFixture,
) -> eyre::Result<()> {
    let first = harness
        .controller
        .create(CreateTaskRequest::new("Buy milk"))
        .await?;
    ensure_matches_fresh_fetch(&harness, "create").await?;
    let second = harness
        .controller
        .create(CreateTaskRequest::new("Walk the dog").with_priority(TaskPriority::High))
        .await?;
    ensure_matches_fresh_fetch(&harness, "second create").await?;

    let outcome = harness.controller.advance(first.id()).await?;
    eyre::ensure!(outcome == MutationOutcome::Applied, "advance was skipped");
    ensure_matches_fresh_fetch(&harness, "advance").await?;

    let outcome = harness.controller.delete(second.id()).await?;
    eyre::ensure!(outcome == MutationOutcome::Applied, "delete was skipped");
    ensure_matches_fresh_fetch(&harness, "delete").await?;

    let stats = harness
        .controller
        .stats()
        .ok_or_else(|| eyre::eyre!("stats missing"))?;
    eyre::ensure!(
        (stats.total, stats.todo, stats.in_progress, stats.done) == (1, 0, 1, 0),
        "unexpected stats {stats:?}"
    );
    Ok(())
}

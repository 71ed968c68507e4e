//! In-memory integration tests for mutation locks and overlapping requests.

use super::helpers::{SyncFixture, harness, wait_until};
use rstest::rstest;
use std::sync::Arc;
use tasksync::task::{
    adapters::memory::RemoteCall,
    domain::TaskStatus,
    ports::{RemoteError, RemoteOperation},
    services::MutationOutcome,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_update_while_pending_sends_nothing(harness: SyncFixture) -> eyre::Result<()> {
    let task = harness.seed("Buy milk", TaskStatus::Todo)?;
    harness.controller.fetch_all().await?;
    let id = task.id();
    harness.authority.hold_mutations();

    let controller = Arc::clone(&harness.controller);
    let pending =
        tokio::spawn(async move { controller.update_status(id, TaskStatus::InProgress).await });
    wait_until(|| harness.controller.is_updating(id)).await?;

    let second = harness
        .controller
        .update_status(id, TaskStatus::InProgress)
        .await?;
    eyre::ensure!(second == MutationOutcome::Skipped, "second update was dispatched");

    harness.authority.release_mutations();
    let first = pending.await??;

    eyre::ensure!(first == MutationOutcome::Applied, "first update was skipped");
    let updates: Vec<RemoteCall> = harness
        .authority
        .calls()?
        .into_iter()
        .filter(|call| call.operation == RemoteOperation::Update)
        .collect();
    eyre::ensure!(updates.len() == 1, "expected one update, saw {}", updates.len());
    eyre::ensure!(
        updates.iter().all(|call| call.task_id == Some(id)),
        "update targeted the wrong task"
    );
    let status = harness
        .controller
        .snapshot()
        .task(id)
        .and_then(|record| record.status());
    eyre::ensure!(status == Some(TaskStatus::InProgress), "status was {status:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn locks_do_not_block_other_tasks(harness: SyncFixture) -> eyre::Result<()> {
    let busy = harness.seed("Busy", TaskStatus::Todo)?;
    let idle = harness.seed("Idle", TaskStatus::Todo)?;
    harness.controller.fetch_all().await?;
    harness.authority.hold_mutations();

    let controller = Arc::clone(&harness.controller);
    let busy_id = busy.id();
    let pending = tokio::spawn(async move { controller.advance(busy_id).await });
    wait_until(|| harness.controller.is_updating(busy_id)).await?;

    let controller = Arc::clone(&harness.controller);
    let idle_id = idle.id();
    let other = tokio::spawn(async move { controller.delete(idle_id).await });
    wait_until(|| {
        harness
            .authority
            .call_count(RemoteOperation::Delete)
            .is_ok_and(|count| count == 1)
    })
    .await?;
    eyre::ensure!(
        harness.controller.is_updating(idle_id),
        "idle task not marked as updating"
    );

    harness.authority.release_mutations();
    eyre::ensure!(pending.await?? == MutationOutcome::Applied, "advance skipped");
    eyre::ensure!(other.await?? == MutationOutcome::Applied, "delete skipped");
    eyre::ensure!(!harness.controller.is_updating(busy_id), "busy lock leaked");
    eyre::ensure!(!harness.controller.is_updating(idle_id), "idle lock leaked");
    eyre::ensure!(harness.controller.tasks().len() == 1, "delete not reflected");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lock_is_released_after_failed_mutation(harness: SyncFixture) -> eyre::Result<()> {
    let task = harness.seed("Buy milk", TaskStatus::Todo)?;
    harness.controller.fetch_all().await?;
    harness.authority.fail_next(
        RemoteOperation::Update,
        RemoteError::status(500, "Internal Server Error"),
    )?;

    let failed = harness.controller.advance(task.id()).await;
    eyre::ensure!(failed.is_err(), "first advance unexpectedly succeeded");
    eyre::ensure!(!harness.controller.is_updating(task.id()), "lock leaked after failure");

    let retried = harness.controller.advance(task.id()).await?;
    eyre::ensure!(retried == MutationOutcome::Applied, "retry was skipped");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_refreshes_settle_on_authority_state(harness: SyncFixture) -> eyre::Result<()> {
    for index in 0..5 {
        harness.seed(&format!("Task {index}"), TaskStatus::Todo)?;
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let controller = Arc::clone(&harness.controller);
            tokio::spawn(async move { controller.fetch_all().await })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    eyre::ensure!(harness.controller.status().is_ready(), "controller not ready");
    eyre::ensure!(
        harness.controller.tasks() == harness.authority.records()?,
        "local view differs from authority"
    );
    Ok(())
}

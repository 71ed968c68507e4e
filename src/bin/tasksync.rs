//! Command-line front end for a remote task service.
//!
//! Usage:
//!
//! ```text
//! tasksync [--api-url URL] [--token TOKEN] <command>
//! ```
//!
//! The base URL falls back to `TASKSYNC_API_URL` and then to
//! `http://localhost:8000`. `TASKSYNC_REQUEST_TIMEOUT_SECS` bounds each
//! request. Log verbosity follows `RUST_LOG` and defaults to `warn`.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tasksync::task::{
    adapters::{
        StaticHostContext,
        http::{API_URL_ENV, ConfigError, HttpTaskClient, RemoteClientConfig},
    },
    domain::{TaskFilter, TaskId, TaskPriority, TaskRecord, TaskStatus},
    ports::RemoteError,
    services::{
        CreateTaskRequest, MutationOutcome, SyncError, TaskSyncController, UpdateTaskRequest,
    },
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

type Controller = TaskSyncController<HttpTaskClient<StaticHostContext>, StaticHostContext>;

#[derive(Debug, Parser)]
#[command(name = "tasksync", version, about = "Synchronize tasks with a remote task service")]
struct Cli {
    /// Base URL of the task service.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Identity token forwarded in the `Authorization` header.
    #[arg(
        long,
        global = true,
        env = "TASKSYNC_IDENTITY_TOKEN",
        default_value = "",
        hide_env_values = true
    )]
    token: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show tasks grouped by status.
    List {
        /// Only show tasks with this status.
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Only show tasks with this priority.
        #[arg(long)]
        priority: Option<TaskPriority>,
    },
    /// Show task counts.
    Stats,
    /// Create a task.
    Add {
        /// Task title.
        title: String,
        /// Longer description.
        #[arg(long)]
        description: Option<String>,
        /// Priority: low, medium or high.
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// Deadline as an RFC 3339 timestamp.
        #[arg(long)]
        deadline: Option<DateTime<Utc>>,
    },
    /// Move a task to the next status in the cycle.
    Advance {
        /// Task identifier.
        id: TaskId,
    },
    /// Move a task to a given status.
    SetStatus {
        /// Task identifier.
        id: TaskId,
        /// Target status: todo, in_progress or done.
        status: TaskStatus,
    },
    /// Change task fields.
    Edit {
        /// Task identifier.
        id: TaskId,
        /// New title.
        #[arg(long)]
        title: Option<String>,
        /// New description.
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        /// Remove the description.
        #[arg(long)]
        clear_description: bool,
        /// New priority.
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// New deadline as an RFC 3339 timestamp.
        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<DateTime<Utc>>,
        /// Remove the deadline.
        #[arg(long)]
        clear_deadline: bool,
    },
    /// Delete a task.
    Delete {
        /// Task identifier.
        id: TaskId,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] RemoteError),
    #[error("{}", .0.user_message())]
    Sync(#[from] SyncError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            // Nothing more can be reported if stderr is gone.
            let _ignored = writeln!(io::stderr().lock(), "error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let api_url = cli.api_url;
    let config = RemoteClientConfig::from_lookup(|key| {
        if key == API_URL_ENV {
            api_url.clone().or_else(|| env::var(key).ok())
        } else {
            env::var(key).ok()
        }
    })?;
    let host = Arc::new(StaticHostContext::new(cli.token));
    let client = HttpTaskClient::new(&config, Arc::clone(&host)).map_err(CliError::Client)?;
    let controller = TaskSyncController::new(Arc::new(client), host);
    let mut out = io::stdout().lock();

    match cli.command {
        Command::List { status, priority } => {
            let mut filter = TaskFilter::all();
            if let Some(wanted) = status {
                filter = filter.with_status(wanted);
            }
            if let Some(wanted) = priority {
                filter = filter.with_priority(wanted);
            }
            controller.fetch_all().await?;
            write_buckets(&mut out, &controller, filter)?;
        }
        Command::Stats => {
            controller.fetch_all().await?;
            write_stats(&mut out, &controller)?;
        }
        Command::Add {
            title,
            description,
            priority,
            deadline,
        } => {
            let mut request = CreateTaskRequest::new(title);
            if let Some(text) = description {
                request = request.with_description(text);
            }
            if let Some(level) = priority {
                request = request.with_priority(level);
            }
            if let Some(at) = deadline {
                request = request.with_deadline(at);
            }
            let created = controller.create(request).await?;
            writeln!(out, "created {}", describe(&created))?;
        }
        Command::Advance { id } => {
            controller.fetch_all().await?;
            let outcome = controller.advance(id).await?;
            write_outcome(&mut out, &controller, id, outcome)?;
        }
        Command::SetStatus { id, status } => {
            let outcome = controller.update_status(id, status).await?;
            write_outcome(&mut out, &controller, id, outcome)?;
        }
        Command::Edit {
            id,
            title,
            description,
            clear_description,
            priority,
            deadline,
            clear_deadline,
        } => {
            let request = edit_request(
                title,
                description,
                clear_description,
                priority,
                deadline,
                clear_deadline,
            );
            let outcome = controller.update(id, request).await?;
            write_outcome(&mut out, &controller, id, outcome)?;
        }
        Command::Delete { id } => {
            let outcome = controller.delete(id).await?;
            match outcome {
                MutationOutcome::Applied => writeln!(out, "deleted task {id}")?,
                MutationOutcome::Skipped => writeln!(out, "task {id} is busy, nothing sent")?,
            }
        }
    }
    Ok(())
}

fn edit_request(
    title: Option<String>,
    description: Option<String>,
    clear_description: bool,
    priority: Option<TaskPriority>,
    deadline: Option<DateTime<Utc>>,
    clear_deadline: bool,
) -> UpdateTaskRequest {
    let mut request = UpdateTaskRequest::new();
    if let Some(text) = title {
        request = request.with_title(text);
    }
    if let Some(text) = description {
        request = request.with_description(text);
    } else if clear_description {
        request = request.clear_description();
    }
    if let Some(level) = priority {
        request = request.with_priority(level);
    }
    if let Some(at) = deadline {
        request = request.with_deadline(at);
    } else if clear_deadline {
        request = request.clear_deadline();
    }
    request
}

fn describe(task: &TaskRecord) -> String {
    let status = task
        .status()
        .map_or("Unknown", TaskStatus::display_label);
    let mut line = format!(
        "#{} [{}] {} ({} priority)",
        task.id(),
        status,
        task.title(),
        task.priority().display_label()
    );
    if let Some(deadline) = task.deadline() {
        line.push_str(&format!(", due {}", deadline.format("%Y-%m-%d %H:%M")));
    }
    line
}

fn write_buckets(
    out: &mut impl Write,
    controller: &Controller,
    filter: TaskFilter,
) -> io::Result<()> {
    let snapshot = controller.snapshot();
    let buckets = snapshot.buckets();
    for (status, tasks) in buckets.iter() {
        if filter.status().is_some_and(|wanted| wanted != status) {
            continue;
        }
        let shown: Vec<&&TaskRecord> = tasks.iter().filter(|task| filter.matches(task)).collect();
        writeln!(out, "{} ({})", status.display_label(), shown.len())?;
        for task in shown {
            let hint = task.status().map_or("Update", TaskStatus::action_label);
            writeln!(out, "  {}  -> {hint}", describe(task))?;
        }
    }
    if buckets.excluded() > 0 {
        writeln!(
            out,
            "{} task(s) with an unrecognised status not shown",
            buckets.excluded()
        )?;
    }
    Ok(())
}

fn write_stats(out: &mut impl Write, controller: &Controller) -> io::Result<()> {
    let Some(stats) = controller.stats() else {
        return writeln!(out, "no stats available");
    };
    writeln!(out, "total        {}", stats.total)?;
    for status in TaskStatus::ALL {
        writeln!(out, "{:<12} {}", status.display_label(), stats.count(status))?;
    }
    writeln!(
        out,
        "priority     high {}, medium {}, low {}",
        stats.high_priority, stats.medium_priority, stats.low_priority
    )
}

fn write_outcome(
    out: &mut impl Write,
    controller: &Controller,
    id: TaskId,
    outcome: MutationOutcome,
) -> io::Result<()> {
    match outcome {
        MutationOutcome::Skipped => writeln!(out, "task {id} is busy, nothing sent"),
        MutationOutcome::Applied => match controller.snapshot().task(id) {
            Some(task) => writeln!(out, "updated {}", describe(task)),
            None => writeln!(out, "updated task {id}"),
        },
    }
}

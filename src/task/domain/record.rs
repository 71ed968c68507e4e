//! Canonical task record as held by the remote authority.

use super::{TaskId, TaskPatch, TaskPriority, TaskStatus, TaskTitle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Task record as returned by the remote authority.
///
/// A status outside [`TaskStatus`] decodes as `None` rather than failing the
/// whole response, so one malformed record cannot hide the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    status: Option<TaskStatus>,
    #[serde(default)]
    priority: TaskPriority,
    #[serde(default)]
    deadline: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// Parameter object for assembling a record on the authority side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecordData {
    /// Assigned identifier.
    pub id: TaskId,
    /// Validated title.
    pub title: TaskTitle,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: TaskStatus,
    /// Display priority.
    pub priority: TaskPriority,
    /// Optional due date.
    pub deadline: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp, if any.
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Builds a record from authority-side data.
    #[must_use]
    pub fn from_data(data: TaskRecordData) -> Self {
        Self {
            id: data.id,
            title: data.title.as_str().to_owned(),
            description: data.description,
            status: Some(data.status),
            priority: data.priority,
            deadline: data.deadline,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the workflow status, or `None` when the remote authority sent
    /// a value outside the known set.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the display priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp, if reported.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Applies a patch the way the remote authority does.
    ///
    /// Only authority implementations call this; clients always re-fetch.
    pub fn apply_patch(&mut self, patch: &TaskPatch, at: DateTime<Utc>) {
        if let Some(title) = patch.title() {
            self.title = title.as_str().to_owned();
        }
        if let Some(description) = patch.description() {
            self.description = description.map(str::to_owned);
        }
        if let Some(status) = patch.status() {
            self.status = Some(status);
        }
        if let Some(priority) = patch.priority() {
            self.priority = priority;
        }
        if let Some(deadline) = patch.deadline() {
            self.deadline = deadline;
        }
        self.updated_at = Some(at);
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<TaskStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match TaskStatus::try_from(value.as_str()) {
        Ok(status) => Some(status),
        Err(err) => {
            tracing::warn!(error = %err, "task record carries an unknown status");
            None
        }
    }))
}

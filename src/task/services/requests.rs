//! Unvalidated request payloads accepted from presentation.

use crate::task::domain::{NewTask, TaskDomainError, TaskPatch, TaskPriority, TaskStatus, TaskTitle};
use chrono::{DateTime, Utc};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    priority: Option<TaskPriority>,
    deadline: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: None,
            deadline: None,
        }
    }

    /// Sets the description. Blank descriptions are dropped.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Validates the request into a create payload.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the title is blank or too long.
    pub fn into_new_task(self) -> Result<NewTask, TaskDomainError> {
        let mut task = NewTask::new(TaskTitle::new(self.title)?);
        if let Some(description) = self.description.filter(|text| !text.trim().is_empty()) {
            task = task.with_description(description);
        }
        if let Some(priority) = self.priority {
            task = task.with_priority(priority);
        }
        if let Some(deadline) = self.deadline {
            task = task.with_deadline(deadline);
        }
        Ok(task)
    }
}

/// Request payload for updating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<Option<String>>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    deadline: Option<Option<DateTime<Utc>>>,
}

impl UpdateTaskRequest {
    /// Creates a request that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description. A blank description removes it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Removes the description.
    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    /// Replaces the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(Some(deadline));
        self
    }

    /// Removes the deadline.
    #[must_use]
    pub const fn clear_deadline(mut self) -> Self {
        self.deadline = Some(None);
        self
    }

    /// Validates the request into a patch.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when a new title is blank or too long.
    pub fn into_patch(self) -> Result<TaskPatch, TaskDomainError> {
        let mut patch = TaskPatch::new();
        if let Some(title) = self.title {
            patch = patch.with_title(TaskTitle::new(title)?);
        }
        match self.description {
            Some(Some(description)) if !description.trim().is_empty() => {
                patch = patch.with_description(description);
            }
            Some(_) => patch = patch.clear_description(),
            None => {}
        }
        if let Some(status) = self.status {
            patch = patch.with_status(status);
        }
        if let Some(priority) = self.priority {
            patch = patch.with_priority(priority);
        }
        match self.deadline {
            Some(Some(deadline)) => patch = patch.with_deadline(deadline),
            Some(None) => patch = patch.clear_deadline(),
            None => {}
        }
        Ok(patch)
    }
}

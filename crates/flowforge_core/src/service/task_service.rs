//! Task CRUD use-case service.
//!
//! # Responsibility
//! - Provide stable create/update entry points for core callers.
//! - Assign end-of-list order keys at creation time.
//!
//! # Invariants
//! - New tasks always sort after every existing task in their partition.
//! - Service APIs never bypass repository validation.

use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::ordering::allocator::{allocate_end_orders, next_order};
use crate::repo::task_repo::{RepoError, TaskRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from task CRUD operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Title is blank after trimming.
    InvalidTitle,
    /// Subtask drafts must not carry a scheduled date of their own.
    SubtaskWithSchedule,
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "task title must not be blank"),
            Self::SubtaskWithSchedule => {
                write!(f, "subtasks inherit their parent's day and cannot be scheduled")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapper for task CRUD operations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one task at the end of the list.
    pub fn add_task(&self, draft: TaskDraft) -> Result<TaskId, TaskServiceError> {
        let existing = self.repo.list_tasks()?;
        let order = next_order(&existing);
        self.create_with_order(draft, order)
    }

    /// Creates a batch of tasks in one call, each spaced one gap apart
    /// after the current end of the list.
    pub fn add_tasks(&self, drafts: Vec<TaskDraft>) -> Result<Vec<TaskId>, TaskServiceError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        let existing = self.repo.list_tasks()?;
        let orders = allocate_end_orders(&existing, drafts.len());
        drafts
            .into_iter()
            .zip(orders)
            .map(|(draft, order)| self.create_with_order(draft, order))
            .collect()
    }

    /// Adds a subtask at the end of the parent's list.
    pub fn add_subtask(
        &self,
        parent_uuid: TaskId,
        draft: TaskDraft,
    ) -> Result<TaskId, TaskServiceError> {
        if draft.scheduled_date.is_some() {
            return Err(TaskServiceError::SubtaskWithSchedule);
        }
        let title = normalize_title(draft.title)?;
        let Some(parent) = self.repo.get_task(parent_uuid)? else {
            return Err(RepoError::NotFound(parent_uuid).into());
        };
        let mut subtask = Task::new(title);
        subtask.description = draft.description;
        subtask.order = next_order(&parent.subtasks);
        Ok(self.repo.create_subtask(parent_uuid, &subtask)?)
    }

    /// Gets one task (with subtasks) by stable ID.
    pub fn get_task(&self, task_uuid: TaskId) -> Result<Option<Task>, TaskServiceError> {
        Ok(self.repo.get_task(task_uuid)?)
    }

    /// Lists all top-level tasks with their subtasks attached.
    pub fn list_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.list_tasks()?)
    }

    /// Marks a task completed, removing it from active ordering.
    pub fn complete_task(&self, task_uuid: TaskId) -> Result<(), TaskServiceError> {
        self.patch(
            task_uuid,
            TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            },
        )
    }

    /// Returns a completed task to the active list. Its previous order key
    /// still applies.
    pub fn reopen_task(&self, task_uuid: TaskId) -> Result<(), TaskServiceError> {
        self.patch(
            task_uuid,
            TaskPatch {
                completed: Some(false),
                ..TaskPatch::default()
            },
        )
    }

    /// Moves a task to another day, or to the Unscheduled bucket with
    /// `None`.
    pub fn schedule_task(
        &self,
        task_uuid: TaskId,
        scheduled_date: Option<String>,
    ) -> Result<(), TaskServiceError> {
        self.patch(
            task_uuid,
            TaskPatch {
                scheduled_date: Some(scheduled_date),
                ..TaskPatch::default()
            },
        )
    }

    pub fn rename_task(
        &self,
        task_uuid: TaskId,
        title: impl Into<String>,
    ) -> Result<(), TaskServiceError> {
        let title = normalize_title(title.into())?;
        self.patch(
            task_uuid,
            TaskPatch {
                title: Some(title),
                ..TaskPatch::default()
            },
        )
    }

    pub fn describe_task(
        &self,
        task_uuid: TaskId,
        description: impl Into<String>,
    ) -> Result<(), TaskServiceError> {
        self.patch(
            task_uuid,
            TaskPatch {
                description: Some(description.into()),
                ..TaskPatch::default()
            },
        )
    }

    /// Deletes a task and its subtasks.
    pub fn remove_task(&self, task_uuid: TaskId) -> Result<(), TaskServiceError> {
        Ok(self.repo.delete_task(task_uuid)?)
    }

    fn patch(&self, task_uuid: TaskId, patch: TaskPatch) -> Result<(), TaskServiceError> {
        Ok(self.repo.update_task_fields(task_uuid, &patch)?)
    }

    fn create_with_order(&self, draft: TaskDraft, order: f64) -> Result<TaskId, TaskServiceError> {
        let title = normalize_title(draft.title)?;
        let mut task = Task::new(title);
        task.description = draft.description;
        task.scheduled_date = draft.scheduled_date;
        task.order = order;
        Ok(self.repo.create_task(&task)?)
    }
}

fn normalize_title(title: String) -> Result<String, TaskServiceError> {
    let normalized = title.trim().to_string();
    if normalized.is_empty() {
        return Err(TaskServiceError::InvalidTitle);
    }
    Ok(normalized)
}

//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its creation/update request
//!   shapes.
//! - Provide validation for write paths.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another task.
//! - Within one date partition, ascending `order` over incomplete tasks is
//!   the user-visible order.
//! - `order` values are partition-local; equal values in different
//!   partitions carry no meaning.
//! - Subtasks nest exactly one level and scope their `order` to the parent.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task and subtask.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Direction for a single-slot move among incomplete siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Canonical task record.
///
/// The shape mirrors the hosted document store's task documents, so the
/// serde field names use the store's camelCase naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable global ID used for updates and change-stream correlation.
    pub uuid: TaskId,
    /// Display title; also the matching key for template propagation.
    /// Collisions are expected — this is not an identifier.
    pub title: String,
    /// Free-form body maintained by the surrounding application.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// ISO calendar date `YYYY-MM-DD`; `None` is the Unscheduled bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    /// Fractional sort key within the date partition, or within the parent
    /// task for subtasks. Not required to be contiguous or integral.
    pub order: f64,
    pub completed: bool,
    /// One level of nesting only; subtasks never carry their own subtasks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Task>,
}

/// Validation failures for task records and patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// UUID must not be nil.
    NilUuid,
    /// Title is blank after trimming.
    BlankTitle,
    /// `scheduled_date` is not a plausible `YYYY-MM-DD` string.
    InvalidScheduledDate(String),
    /// `order` is NaN or infinite.
    NonFiniteOrder,
    /// A subtask carries its own subtasks.
    NestedSubtask(TaskId),
    /// A subtask carries a `scheduled_date` of its own.
    ScheduledSubtask(TaskId),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "task uuid must not be nil"),
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::InvalidScheduledDate(value) => {
                write!(f, "scheduled date must be YYYY-MM-DD, got `{value}`")
            }
            Self::NonFiniteOrder => write!(f, "task order must be a finite number"),
            Self::NestedSubtask(id) => {
                write!(f, "subtask {id} must not carry its own subtasks")
            }
            Self::ScheduledSubtask(id) => {
                write!(f, "subtask {id} must not carry a scheduled date")
            }
        }
    }
}

impl Error for TaskValidationError {}

impl Task {
    /// Creates a new unscheduled, incomplete task with a generated ID and
    /// an order of `0.0`. Callers assign the real end-of-list key through
    /// the allocator before persisting.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            scheduled_date: None,
            order: 0.0,
            completed: false,
            subtasks: Vec::new(),
        }
    }

    /// Creates a task with a caller-provided stable ID.
    pub fn with_id(uuid: TaskId, title: impl Into<String>) -> Result<Self, TaskValidationError> {
        if uuid.is_nil() {
            return Err(TaskValidationError::NilUuid);
        }
        let mut task = Self::new(title);
        task.uuid = uuid;
        Ok(task)
    }

    /// Partition key for ordering purposes; `None` is the Unscheduled
    /// bucket.
    pub fn partition_key(&self) -> Option<&str> {
        self.scheduled_date.as_deref()
    }

    /// Validates the record for persistence.
    ///
    /// # Contract
    /// - Title must survive trimming.
    /// - `scheduled_date` must be a plausible ISO date when present.
    /// - `order` must be finite, on the task and on every subtask.
    /// - Subtasks nest one level and never carry their own date.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.uuid.is_nil() {
            return Err(TaskValidationError::NilUuid);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if let Some(date) = &self.scheduled_date {
            validate_scheduled_date(date)?;
        }
        if !self.order.is_finite() {
            return Err(TaskValidationError::NonFiniteOrder);
        }
        for subtask in &self.subtasks {
            if !subtask.subtasks.is_empty() {
                return Err(TaskValidationError::NestedSubtask(subtask.uuid));
            }
            if subtask.scheduled_date.is_some() {
                return Err(TaskValidationError::ScheduledSubtask(subtask.uuid));
            }
            if subtask.title.trim().is_empty() {
                return Err(TaskValidationError::BlankTitle);
            }
            if !subtask.order.is_finite() {
                return Err(TaskValidationError::NonFiniteOrder);
            }
        }
        Ok(())
    }
}

/// Checks the `YYYY-MM-DD` shape plus a plausible month/day range.
///
/// Calendar-exact validation (leap years, month lengths) is left to the
/// hosted store; partition keys only need to compare lexicographically.
pub fn validate_scheduled_date(value: &str) -> Result<(), TaskValidationError> {
    static DATE_SHAPE: OnceCell<Regex> = OnceCell::new();
    let shape = DATE_SHAPE
        .get_or_init(|| Regex::new(r"^\d{4}-(\d{2})-(\d{2})$").expect("date pattern compiles"));

    let invalid = || TaskValidationError::InvalidScheduledDate(value.to_string());
    let captures = shape.captures(value).ok_or_else(invalid)?;
    let month: u32 = captures[1].parse().map_err(|_| invalid())?;
    let day: u32 = captures[2].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }
    Ok(())
}

/// Creation request for one task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub scheduled_date: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn scheduled(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            scheduled_date: Some(date.into()),
            ..Self::default()
        }
    }
}

/// Partial field update applied through `update_task_fields`.
///
/// `scheduled_date` uses two option levels: outer `None` leaves the field
/// alone, `Some(None)` moves the task to the Unscheduled bucket.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_date: Option<Option<String>>,
    pub order: Option<f64>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.scheduled_date.is_none()
            && self.order.is_none()
            && self.completed.is_none()
    }
}

/// Single order reassignment emitted by the reorder engines and consumed
/// by the reconciliation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub task_uuid: TaskId,
    pub order: f64,
}

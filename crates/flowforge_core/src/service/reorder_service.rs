//! Reorder reconciliation service.
//!
//! # Responsibility
//! - Bridge engine output to board state and persisted storage.
//! - Apply order changes optimistically and roll back on store failure.
//!
//! # Invariants
//! - One logical reorder persists as one atomic batch.
//! - A failed batch leaves the board at its pre-operation keys and yields
//!   exactly one user-visible failure.
//! - Engine no-ops (unknown task, boundary move, empty template) are
//!   normal `NoOp` outcomes, never errors.

use crate::board::TaskBoard;
use crate::model::task::{MoveDirection, OrderUpdate, Task, TaskId};
use crate::ordering::pairwise::compute_move;
use crate::ordering::template::reorder_all_tasks;
use crate::repo::task_repo::{RepoError, TaskRepository};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result of one reorder dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Updates were applied locally and persisted.
    Applied { update_count: usize },
    /// The engine produced no updates; nothing changed.
    NoOp,
}

/// Store failure surfaced for one reorder batch.
#[derive(Debug)]
pub enum ReorderError {
    /// Persistence failed; the board was rolled back to its pre-operation
    /// keys.
    RolledBack {
        update_count: usize,
        source: RepoError,
    },
}

impl ReorderError {
    /// Single notification line for the UI toast. One per batch, never
    /// one per task.
    pub fn user_message(&self) -> String {
        match self {
            Self::RolledBack { update_count, .. } => format!(
                "Could not save the new task order ({update_count} tasks); your change was reverted."
            ),
        }
    }
}

impl Display for ReorderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RolledBack {
                update_count,
                source,
            } => write!(
                f,
                "reorder batch of {update_count} failed and was rolled back: {source}"
            ),
        }
    }
}

impl Error for ReorderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RolledBack { source, .. } => Some(source),
        }
    }
}

/// Reconciliation layer between the ordering engines, the in-memory board
/// and the store.
///
/// Operations compute against the board state current at dispatch time;
/// concurrent writes from other sessions resolve last-writer-wins on the
/// persisted key, matching the store's update semantics.
pub struct ReorderService<R: TaskRepository> {
    repo: R,
    board: TaskBoard,
}

impl<R: TaskRepository> ReorderService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            board: TaskBoard::new(),
        }
    }

    /// Reloads the board from a fresh store snapshot.
    pub fn refresh_from_store(&mut self) -> Result<(), RepoError> {
        let tasks = self.repo.list_tasks()?;
        self.board.replace_all(tasks);
        Ok(())
    }

    /// Read access to the board state.
    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    /// Merges one confirmed change from the store's change stream.
    pub fn apply_remote_change(&mut self, task: Task) {
        self.board.apply_remote_change(task);
    }

    /// Drops a task the change stream reported as deleted.
    pub fn apply_remote_removal(&mut self, task_uuid: TaskId) -> bool {
        self.board.remove(task_uuid)
    }

    /// Moves a task one slot among the incomplete tasks of its partition.
    pub fn move_task(
        &mut self,
        task_uuid: TaskId,
        direction: MoveDirection,
    ) -> Result<BatchOutcome, ReorderError> {
        let Some(task) = self.board.tasks().iter().find(|t| t.uuid == task_uuid) else {
            debug!(
                "event=reorder_move module=reconcile status=skip reason=unknown_task task={task_uuid}"
            );
            return Ok(BatchOutcome::NoOp);
        };
        let partition = task.partition_key().map(str::to_owned);
        let siblings: Vec<Task> = self
            .board
            .partition_tasks(partition.as_deref())
            .into_iter()
            .cloned()
            .collect();
        let updates = compute_move(task_uuid, direction, &siblings);
        self.commit(updates)
    }

    /// Moves a subtask one slot within its parent's list.
    pub fn move_subtask(
        &mut self,
        parent_uuid: TaskId,
        subtask_uuid: TaskId,
        direction: MoveDirection,
    ) -> Result<BatchOutcome, ReorderError> {
        let Some(parent) = self.board.tasks().iter().find(|t| t.uuid == parent_uuid) else {
            debug!(
                "event=reorder_move module=reconcile status=skip reason=unknown_parent task={parent_uuid}"
            );
            return Ok(BatchOutcome::NoOp);
        };
        let siblings = parent.subtasks.clone();
        let updates = compute_move(subtask_uuid, direction, &siblings);
        self.commit(updates)
    }

    /// Propagates one template day's order to the other scheduled
    /// partitions, optionally restricted to an inclusive date range.
    pub fn propagate_template(
        &mut self,
        template_date: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<BatchOutcome, ReorderError> {
        let updates = reorder_all_tasks(self.board.tasks(), template_date, start_date, end_date);
        self.commit(updates)
    }

    fn commit(&mut self, updates: Vec<OrderUpdate>) -> Result<BatchOutcome, ReorderError> {
        if updates.is_empty() {
            return Ok(BatchOutcome::NoOp);
        }

        let journal = self.board.apply_order_updates(&updates);
        match self.repo.batch_update_orders(&updates) {
            Ok(()) => {
                info!(
                    "event=reorder_persist module=reconcile status=ok update_count={}",
                    updates.len()
                );
                Ok(BatchOutcome::Applied {
                    update_count: updates.len(),
                })
            }
            Err(source) => {
                self.board.rollback(&journal);
                error!(
                    "event=reorder_persist module=reconcile status=error update_count={} error={source}",
                    updates.len()
                );
                Err(ReorderError::RolledBack {
                    update_count: updates.len(),
                    source,
                })
            }
        }
    }
}

//! In-memory task board state.
//!
//! # Responsibility
//! - Own the task list shared by UI-facing callers.
//! - Constrain mutation to optimistic order application, rollback, and
//!   confirmed remote merges.
//!
//! # Invariants
//! - `order` is only written through `apply_order_updates`, `rollback`
//!   and `apply_remote_change`.
//! - Partition views are sorted ascending by `order`, ties by `uuid`.

use crate::model::task::{OrderUpdate, Task, TaskId};

/// State-owning container for one user's tasks.
///
/// The command path (optimistic apply + rollback) and the event path
/// (confirmed remote changes) both land here, so local and remote state
/// never live in separate copies of the list.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces board contents with a full store snapshot.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Read snapshot of all top-level tasks.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Finds a top-level task or one of its subtasks.
    pub fn get(&self, task_uuid: TaskId) -> Option<&Task> {
        for task in &self.tasks {
            if task.uuid == task_uuid {
                return Some(task);
            }
            if let Some(subtask) = task.subtasks.iter().find(|s| s.uuid == task_uuid) {
                return Some(subtask);
            }
        }
        None
    }

    /// One date partition's top-level tasks, ascending by `order`.
    ///
    /// Completed tasks are included; the ordering engines skip them
    /// themselves.
    pub fn partition_tasks(&self, scheduled_date: Option<&str>) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.partition_key() == scheduled_date)
            .collect();
        tasks.sort_by(|a, b| a.order.total_cmp(&b.order).then_with(|| a.uuid.cmp(&b.uuid)));
        tasks
    }

    /// Applies order updates optimistically.
    ///
    /// Returns the journal of previous keys for exactly the tasks that were
    /// found and rewritten; unknown ids are skipped silently. Pass the
    /// journal to [`TaskBoard::rollback`] if persistence fails.
    pub fn apply_order_updates(&mut self, updates: &[OrderUpdate]) -> Vec<OrderUpdate> {
        let mut journal = Vec::with_capacity(updates.len());
        for update in updates {
            if let Some(task) = self.get_mut(update.task_uuid) {
                journal.push(OrderUpdate {
                    task_uuid: update.task_uuid,
                    order: task.order,
                });
                task.order = update.order;
            }
        }
        journal
    }

    /// Restores the keys recorded by [`TaskBoard::apply_order_updates`].
    pub fn rollback(&mut self, journal: &[OrderUpdate]) {
        for entry in journal {
            if let Some(task) = self.get_mut(entry.task_uuid) {
                task.order = entry.order;
            }
        }
    }

    /// Merges one confirmed task state from the store's change stream.
    ///
    /// Last writer wins: the incoming record replaces the local copy
    /// wholesale, or is appended when unknown.
    pub fn apply_remote_change(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.uuid == task.uuid) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Drops a task that was removed remotely.
    pub fn remove(&mut self, task_uuid: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.uuid != task_uuid);
        before != self.tasks.len()
    }

    fn get_mut(&mut self, task_uuid: TaskId) -> Option<&mut Task> {
        for task in &mut self.tasks {
            if task.uuid == task_uuid {
                return Some(task);
            }
            if let Some(subtask) = task.subtasks.iter_mut().find(|s| s.uuid == task_uuid) {
                return Some(subtask);
            }
        }
        None
    }
}

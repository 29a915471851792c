//! Core ordering and reconciliation logic for FlowForge.
//! This crate is the single source of truth for task-order invariants.

pub mod board;
pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;

pub use board::TaskBoard;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    MoveDirection, OrderUpdate, Task, TaskDraft, TaskId, TaskPatch, TaskValidationError,
};
pub use ordering::allocator::{allocate_end_orders, next_order};
pub use ordering::pairwise::compute_move;
pub use ordering::template::reorder_all_tasks;
pub use ordering::ORDER_GAP;
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::reorder_service::{BatchOutcome, ReorderError, ReorderService};
pub use service::task_service::{TaskService, TaskServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

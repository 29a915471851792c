//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the store operations the reconciliation layer persists
//!   through, in request/response form.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - `batch_update_orders` is atomic: one transaction, all rows or none.
//! - Listing is deterministic: scheduled partitions ascending, then
//!   `sort_order ASC, task_uuid ASC`; subtasks likewise within the parent.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::task::{
    validate_scheduled_date, OrderUpdate, Task, TaskId, TaskPatch, TaskValidationError,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_COLUMNS: &str = "task_uuid, title, description, scheduled_date, sort_order, completed";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table is missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column is missing: {table}.{column}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store contract used by services and the reconciliation layer.
///
/// This is the request/response face of the hosted document store; the
/// live change stream stays with the surrounding application, which feeds
/// confirmed records into the board instead.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn create_subtask(&self, parent_uuid: TaskId, subtask: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, task_uuid: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn update_task_fields(&self, task_uuid: TaskId, patch: &TaskPatch) -> RepoResult<()>;
    fn batch_update_orders(&self, updates: &[OrderUpdate]) -> RepoResult<()>;
    fn delete_task(&self, task_uuid: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository over a migrated connection.
#[derive(Debug)]
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

const REQUIRED_COLUMNS: &[&str] = &[
    "task_uuid",
    "parent_uuid",
    "title",
    "description",
    "scheduled_date",
    "sort_order",
    "completed",
];

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a migrated connection, verifying the schema shape first.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version =
            conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        verify_task_table(conn)?;
        Ok(Self { conn })
    }
}

fn verify_task_table(conn: &Connection) -> RepoResult<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(tasks);")?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }
    for &required in REQUIRED_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column: required,
            });
        }
    }
    Ok(())
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        insert_task_row(&tx, task, None)?;
        for subtask in &task.subtasks {
            insert_task_row(&tx, subtask, Some(task.uuid))?;
        }
        tx.commit()?;
        Ok(task.uuid)
    }

    fn create_subtask(&self, parent_uuid: TaskId, subtask: &Task) -> RepoResult<TaskId> {
        subtask.validate()?;
        if !subtask.subtasks.is_empty() {
            return Err(TaskValidationError::NestedSubtask(subtask.uuid).into());
        }
        if subtask.scheduled_date.is_some() {
            return Err(TaskValidationError::ScheduledSubtask(subtask.uuid).into());
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let parent_exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM tasks WHERE task_uuid = ?1 AND parent_uuid IS NULL;",
            params![parent_uuid.to_string()],
            |row| row.get(0),
        )?;
        if parent_exists == 0 {
            return Err(RepoError::NotFound(parent_uuid));
        }
        insert_task_row(&tx, subtask, Some(parent_uuid))?;
        tx.commit()?;
        Ok(subtask.uuid)
    }

    fn get_task(&self, task_uuid: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE task_uuid = ?1 AND parent_uuid IS NULL;"
        ))?;
        let mut rows = stmt.query(params![task_uuid.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut task = parse_task_row(row)?;
        task.subtasks = load_subtasks(self.conn, task.uuid)?;
        Ok(Some(task))
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE parent_uuid IS NULL
             ORDER BY scheduled_date IS NULL, scheduled_date ASC, sort_order ASC, task_uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        for task in &mut tasks {
            task.subtasks = load_subtasks(self.conn, task.uuid)?;
        }
        Ok(tasks)
    }

    fn update_task_fields(&self, task_uuid: TaskId, patch: &TaskPatch) -> RepoResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(TaskValidationError::BlankTitle.into());
            }
        }
        if let Some(Some(date)) = &patch.scheduled_date {
            validate_scheduled_date(date)?;
        }
        if let Some(order) = patch.order {
            if !order.is_finite() {
                return Err(TaskValidationError::NonFiniteOrder.into());
            }
        }

        let mut assignments: Vec<&'static str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(title) = &patch.title {
            assignments.push("title = ?");
            values.push(Value::from(title.clone()));
        }
        if let Some(description) = &patch.description {
            assignments.push("description = ?");
            values.push(Value::from(description.clone()));
        }
        if let Some(scheduled_date) = &patch.scheduled_date {
            assignments.push("scheduled_date = ?");
            values.push(match scheduled_date {
                Some(date) => Value::from(date.clone()),
                None => Value::Null,
            });
        }
        if let Some(order) = patch.order {
            assignments.push("sort_order = ?");
            values.push(Value::from(order));
        }
        if let Some(completed) = patch.completed {
            assignments.push("completed = ?");
            values.push(Value::from(completed));
        }
        values.push(Value::from(task_uuid.to_string()));

        let sql = format!(
            "UPDATE tasks
             SET {}, updated_at = (strftime('%s', 'now') * 1000)
             WHERE task_uuid = ?;",
            assignments.join(", ")
        );
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(task_uuid));
        }
        Ok(())
    }

    fn batch_update_orders(&self, updates: &[OrderUpdate]) -> RepoResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        for update in updates {
            if !update.order.is_finite() {
                return Err(TaskValidationError::NonFiniteOrder.into());
            }
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for update in updates {
            let changed = tx.execute(
                "UPDATE tasks
                 SET sort_order = ?2, updated_at = (strftime('%s', 'now') * 1000)
                 WHERE task_uuid = ?1;",
                params![update.task_uuid.to_string(), update.order],
            )?;
            if changed == 0 {
                // Dropping the transaction rolls back every prior row.
                return Err(RepoError::NotFound(update.task_uuid));
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_task(&self, task_uuid: TaskId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM tasks WHERE parent_uuid = ?1;",
            params![task_uuid.to_string()],
        )?;
        let changed = tx.execute(
            "DELETE FROM tasks WHERE task_uuid = ?1;",
            params![task_uuid.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(task_uuid));
        }
        tx.commit()?;
        Ok(())
    }
}

fn insert_task_row(conn: &Connection, task: &Task, parent: Option<TaskId>) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO tasks (task_uuid, parent_uuid, title, description, scheduled_date, sort_order, completed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            task.uuid.to_string(),
            parent.map(|id| id.to_string()),
            task.title,
            task.description,
            task.scheduled_date,
            task.order,
            task.completed,
        ],
    )?;
    Ok(())
}

fn load_subtasks(conn: &Connection, parent_uuid: TaskId) -> RepoResult<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE parent_uuid = ?1
         ORDER BY sort_order ASC, task_uuid ASC;"
    ))?;
    let mut rows = stmt.query(params![parent_uuid.to_string()])?;
    let mut subtasks = Vec::new();
    while let Some(row) = rows.next()? {
        subtasks.push(parse_task_row(row)?);
    }
    Ok(subtasks)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let raw_uuid: String = row.get("task_uuid")?;
    let uuid = Uuid::parse_str(&raw_uuid)
        .map_err(|err| RepoError::InvalidData(format!("bad task uuid `{raw_uuid}`: {err}")))?;
    Ok(Task {
        uuid,
        title: row.get("title")?,
        description: row.get("description")?,
        scheduled_date: row.get("scheduled_date")?,
        order: row.get("sort_order")?,
        completed: row.get("completed")?,
        subtasks: Vec::new(),
    })
}

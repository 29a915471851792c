//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise the core crate end to end against an in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use flowforge_core::db::open_db_in_memory;
use flowforge_core::{
    BatchOutcome, MoveDirection, ReorderService, SqliteTaskRepository, TaskDraft, TaskService,
};

const TEMPLATE_DAY: &str = "2026-08-06";
const NEXT_DAY: &str = "2026-08-07";

fn main() {
    if let Err(err) = run() {
        eprintln!("flowforge smoke run failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("flowforge_core version={}", flowforge_core::core_version());

    let conn = open_db_in_memory()?;
    let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn)?);

    tasks.add_tasks(vec![
        TaskDraft::scheduled("Plan sprint", TEMPLATE_DAY),
        TaskDraft::scheduled("Write report", TEMPLATE_DAY),
        TaskDraft::scheduled("Review queue", TEMPLATE_DAY),
        TaskDraft::scheduled("Review queue", NEXT_DAY),
        TaskDraft::scheduled("Plan sprint", NEXT_DAY),
    ])?;

    let mut reorder = ReorderService::new(SqliteTaskRepository::try_new(&conn)?);
    reorder.refresh_from_store()?;

    let Some(second) = reorder
        .board()
        .partition_tasks(Some(TEMPLATE_DAY))
        .get(1)
        .map(|task| task.uuid)
    else {
        return Err("expected a seeded second task".into());
    };

    match reorder.move_task(second, MoveDirection::Up)? {
        BatchOutcome::Applied { update_count } => println!("move applied updates={update_count}"),
        BatchOutcome::NoOp => println!("move was a no-op"),
    }
    match reorder.propagate_template(TEMPLATE_DAY, None, None)? {
        BatchOutcome::Applied { update_count } => {
            println!("propagation applied updates={update_count}")
        }
        BatchOutcome::NoOp => println!("propagation was a no-op"),
    }

    for day in [TEMPLATE_DAY, NEXT_DAY] {
        println!("-- {day}");
        for task in reorder.board().partition_tasks(Some(day)) {
            println!("{:>10.1}  {}", task.order, task.title);
        }
    }
    Ok(())
}

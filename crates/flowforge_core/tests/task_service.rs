use flowforge_core::db::open_db_in_memory;
use flowforge_core::{
    SqliteTaskRepository, TaskDraft, TaskService, TaskServiceError,
};

fn setup(conn: &rusqlite::Connection) -> TaskService<SqliteTaskRepository<'_>> {
    TaskService::new(SqliteTaskRepository::try_new(conn).unwrap())
}

#[test]
fn created_tasks_land_after_every_existing_task() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    service
        .add_tasks(vec![
            TaskDraft::scheduled("Standup", "2026-08-06"),
            TaskDraft::scheduled("Standup", "2026-08-07"),
        ])
        .unwrap();
    let late = service
        .add_task(TaskDraft::scheduled("Retro", "2026-08-06"))
        .unwrap();

    let tasks = service.list_tasks().unwrap();
    let max_existing = tasks
        .iter()
        .filter(|t| t.uuid != late)
        .map(|t| t.order)
        .fold(f64::MIN, f64::max);
    let late_order = tasks.iter().find(|t| t.uuid == late).unwrap().order;
    assert!(late_order > max_existing);
}

#[test]
fn blank_titles_are_rejected_before_the_store() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let err = service.add_task(TaskDraft::new("   ")).unwrap_err();
    match err {
        TaskServiceError::InvalidTitle => {}
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list_tasks().unwrap().is_empty());
}

#[test]
fn titles_are_trimmed_on_create_and_rename() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let id = service.add_task(TaskDraft::new("  Water plants  ")).unwrap();
    assert_eq!(
        service.get_task(id).unwrap().unwrap().title,
        "Water plants"
    );

    service.rename_task(id, " Water the garden ").unwrap();
    assert_eq!(
        service.get_task(id).unwrap().unwrap().title,
        "Water the garden"
    );
}

#[test]
fn complete_reopen_and_schedule_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let id = service
        .add_task(TaskDraft::scheduled("Pay rent", "2026-08-31"))
        .unwrap();

    service.complete_task(id).unwrap();
    assert!(service.get_task(id).unwrap().unwrap().completed);

    service.reopen_task(id).unwrap();
    assert!(!service.get_task(id).unwrap().unwrap().completed);

    service.schedule_task(id, None).unwrap();
    assert_eq!(service.get_task(id).unwrap().unwrap().scheduled_date, None);

    service
        .schedule_task(id, Some("2026-09-01".to_string()))
        .unwrap();
    assert_eq!(
        service.get_task(id).unwrap().unwrap().scheduled_date.as_deref(),
        Some("2026-09-01")
    );

    service.describe_task(id, "Transfer before noon").unwrap();
    assert_eq!(
        service.get_task(id).unwrap().unwrap().description,
        "Transfer before noon"
    );
}

#[test]
fn subtask_drafts_cannot_carry_their_own_day() {
    let conn = open_db_in_memory().unwrap();
    let service = setup(&conn);

    let parent = service
        .add_task(TaskDraft::scheduled("Trip prep", "2026-08-20"))
        .unwrap();
    let err = service
        .add_subtask(parent, TaskDraft::scheduled("Book hotel", "2026-08-21"))
        .unwrap_err();
    match err {
        TaskServiceError::SubtaskWithSchedule => {}
        other => panic!("unexpected error: {other}"),
    }

    service
        .add_subtask(parent, TaskDraft::new("Book hotel"))
        .unwrap();
    let second = service
        .add_subtask(parent, TaskDraft::new("Pack bags"))
        .unwrap();

    let loaded = service.get_task(parent).unwrap().unwrap();
    assert_eq!(loaded.subtasks.len(), 2);
    // The second subtask was allocated after the first.
    assert_eq!(loaded.subtasks[1].uuid, second);
    assert!(loaded.subtasks[0].order < loaded.subtasks[1].order);

    service.remove_task(parent).unwrap();
    assert!(service.get_task(parent).unwrap().is_none());
}

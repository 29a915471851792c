use flowforge_core::{Task, TaskValidationError};
use uuid::Uuid;

#[test]
fn task_new_sets_defaults() {
    let task = Task::new("hello");

    assert!(!task.uuid.is_nil());
    assert_eq!(task.title, "hello");
    assert_eq!(task.description, "");
    assert_eq!(task.scheduled_date, None);
    assert_eq!(task.order, 0.0);
    assert!(!task.completed);
    assert!(task.subtasks.is_empty());
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Task::with_id(Uuid::nil(), "invalid").unwrap_err();
    assert_eq!(err, TaskValidationError::NilUuid);
}

#[test]
fn validate_rejects_blank_title() {
    let task = Task::new("   ");
    assert_eq!(task.validate().unwrap_err(), TaskValidationError::BlankTitle);
}

#[test]
fn validate_rejects_malformed_dates() {
    for bad in ["tomorrow", "2024-1-05", "2024-13-01", "2024-00-10", "2024-01-32"] {
        let mut task = Task::new("dated");
        task.scheduled_date = Some(bad.to_string());
        assert_eq!(
            task.validate().unwrap_err(),
            TaskValidationError::InvalidScheduledDate(bad.to_string()),
            "`{bad}` should be rejected"
        );
    }

    let mut task = Task::new("dated");
    task.scheduled_date = Some("2024-02-29".to_string());
    assert!(task.validate().is_ok());
}

#[test]
fn validate_rejects_non_finite_order() {
    let mut task = Task::new("drifting");
    task.order = f64::NAN;
    assert_eq!(
        task.validate().unwrap_err(),
        TaskValidationError::NonFiniteOrder
    );
}

#[test]
fn validate_rejects_deep_nesting_and_scheduled_subtasks() {
    let mut inner = Task::new("inner");
    inner.subtasks.push(Task::new("too deep"));
    let mut parent = Task::new("parent");
    let inner_uuid = inner.uuid;
    parent.subtasks.push(inner);
    assert_eq!(
        parent.validate().unwrap_err(),
        TaskValidationError::NestedSubtask(inner_uuid)
    );

    let mut scheduled_sub = Task::new("sub");
    scheduled_sub.scheduled_date = Some("2024-05-01".to_string());
    let sub_uuid = scheduled_sub.uuid;
    let mut parent = Task::new("parent");
    parent.subtasks.push(scheduled_sub);
    assert_eq!(
        parent.validate().unwrap_err(),
        TaskValidationError::ScheduledSubtask(sub_uuid)
    );
}

#[test]
fn task_serialization_uses_store_wire_fields() {
    let task_uuid = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut task = Task::with_id(task_uuid, "Morning run").unwrap();
    task.scheduled_date = Some("2026-08-06".to_string());
    task.order = 1500.5;

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["uuid"], task_uuid.to_string());
    assert_eq!(json["title"], "Morning run");
    assert_eq!(json["scheduledDate"], "2026-08-06");
    assert_eq!(json["order"], 1500.5);
    assert_eq!(json["completed"], false);
    // Empty optional fields stay off the wire.
    assert!(json.get("description").is_none());
    assert!(json.get("subtasks").is_none());

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn unscheduled_tasks_deserialize_without_date_field() {
    let decoded: Task = serde_json::from_str(
        r#"{"uuid":"11111111-2222-4333-8444-555555555555","title":"Inbox","order":0.0,"completed":false}"#,
    )
    .unwrap();
    assert_eq!(decoded.partition_key(), None);
    assert!(decoded.subtasks.is_empty());
}

use flowforge_core::{reorder_all_tasks, OrderUpdate, Task, TaskId};
use uuid::Uuid;

fn day_task(id: u128, title: &str, date: &str, order: f64) -> Task {
    let mut task = Task::with_id(Uuid::from_u128(id), title).unwrap();
    task.scheduled_date = Some(date.to_string());
    task.order = order;
    task
}

fn apply(tasks: &mut [Task], updates: &[OrderUpdate]) {
    for update in updates {
        if let Some(task) = tasks.iter_mut().find(|t| t.uuid == update.task_uuid) {
            task.order = update.order;
        }
    }
}

fn day_titles(tasks: &[Task], date: &str) -> Vec<String> {
    let mut day: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.scheduled_date.as_deref() == Some(date))
        .collect();
    day.sort_by(|a, b| a.order.total_cmp(&b.order));
    day.into_iter().map(|t| t.title.clone()).collect()
}

fn order_of(tasks: &[Task], id: TaskId) -> f64 {
    tasks.iter().find(|t| t.uuid == id).unwrap().order
}

#[test]
fn duplicate_template_titles_rank_by_first_occurrence() {
    let mut tasks = vec![
        day_task(1, "Gym", "2024-01-01", 0.0),
        day_task(2, "Gym", "2024-01-01", 1.0),
        day_task(3, "Read", "2024-01-01", 2.0),
        day_task(4, "Read", "2024-01-02", 0.0),
        day_task(5, "Gym", "2024-01-02", 1.0),
        day_task(6, "Write", "2024-01-02", 2.0),
    ];

    let updates = reorder_all_tasks(&tasks, "2024-01-01", None, None);
    apply(&mut tasks, &updates);

    assert_eq!(day_titles(&tasks, "2024-01-02"), vec!["Gym", "Read", "Write"]);
    // Write already sat at index 2, so only Gym and Read are rewritten.
    assert_eq!(updates.len(), 2);
    assert_eq!(order_of(&tasks, Uuid::from_u128(5)), 0.0);
    assert_eq!(order_of(&tasks, Uuid::from_u128(4)), 1.0);
    // Template-day tasks are never rewritten.
    assert_eq!(order_of(&tasks, Uuid::from_u128(1)), 0.0);
    assert_eq!(order_of(&tasks, Uuid::from_u128(2)), 1.0);
}

#[test]
fn propagation_is_idempotent() {
    let mut tasks = vec![
        day_task(1, "Plan", "2024-03-01", 0.0),
        day_task(2, "Build", "2024-03-01", 1.0),
        day_task(3, "Build", "2024-03-02", 100.0),
        day_task(4, "Plan", "2024-03-02", 200.0),
        day_task(5, "Ship", "2024-03-02", 300.0),
    ];

    let first = reorder_all_tasks(&tasks, "2024-03-01", None, None);
    assert!(!first.is_empty());
    apply(&mut tasks, &first);
    assert_eq!(day_titles(&tasks, "2024-03-02"), vec!["Plan", "Build", "Ship"]);

    let second = reorder_all_tasks(&tasks, "2024-03-01", None, None);
    assert!(second.is_empty());
}

#[test]
fn date_range_bounds_restrict_rewritten_partitions() {
    let tasks = vec![
        day_task(1, "Gym", "2024-01-01", 0.0),
        day_task(2, "Gym", "2024-01-15", 5.0),
        day_task(3, "Gym", "2024-02-10", 5.0),
        day_task(4, "Gym", "2023-12-31", 5.0),
    ];

    let updates = reorder_all_tasks(&tasks, "2024-01-01", Some("2024-01-01"), Some("2024-01-31"));

    let touched: Vec<TaskId> = updates.iter().map(|u| u.task_uuid).collect();
    assert_eq!(touched, vec![Uuid::from_u128(2)]);
}

#[test]
fn single_task_partitions_already_in_place_need_no_updates() {
    let tasks = vec![
        day_task(1, "Write report", "2024-01-01", 0.0),
        day_task(2, "Write report", "2024-01-02", 0.0),
    ];

    assert!(reorder_all_tasks(&tasks, "2024-01-01", None, None).is_empty());
}

#[test]
fn empty_template_day_yields_no_updates() {
    let tasks = vec![
        day_task(1, "Gym", "2024-01-02", 3.0),
        day_task(2, "Read", "2024-01-02", 7.0),
    ];

    assert!(reorder_all_tasks(&tasks, "2024-01-01", None, None).is_empty());
}

#[test]
fn partitions_without_shared_titles_are_reindexed_in_prior_order() {
    let tasks = vec![
        day_task(1, "Template only", "2024-01-01", 0.0),
        day_task(2, "Alpha", "2024-01-02", 7.0),
        day_task(3, "Beta", "2024-01-02", 3.0),
    ];

    let mut applied = tasks.clone();
    let updates = reorder_all_tasks(&tasks, "2024-01-01", None, None);
    apply(&mut applied, &updates);

    // Prior relative order (Beta before Alpha) survives the reindex.
    assert_eq!(day_titles(&applied, "2024-01-02"), vec!["Beta", "Alpha"]);
    assert_eq!(order_of(&applied, Uuid::from_u128(3)), 0.0);
    assert_eq!(order_of(&applied, Uuid::from_u128(2)), 1.0);
}

#[test]
fn completed_tasks_are_excluded_from_template_and_targets() {
    let mut done_template = day_task(1, "Gym", "2024-01-01", 0.0);
    done_template.completed = true;
    let mut done_target = day_task(5, "Read", "2024-01-02", 9.0);
    done_target.completed = true;

    let tasks = vec![
        done_template,
        day_task(2, "Read", "2024-01-01", 1.0),
        day_task(3, "Gym", "2024-01-02", 0.0),
        day_task(4, "Read", "2024-01-02", 1.0),
        done_target,
    ];

    let updates = reorder_all_tasks(&tasks, "2024-01-01", None, None);

    // The completed Gym never made it into the template mapping, so Read
    // ranks first and Gym trails as unmatched.
    let mut applied = tasks.clone();
    apply(&mut applied, &updates);
    let day2: Vec<String> = day_titles(&applied, "2024-01-02");
    assert_eq!(day2, vec!["Read", "Gym", "Read"]);
    assert_eq!(order_of(&applied, Uuid::from_u128(4)), 0.0);
    assert_eq!(order_of(&applied, Uuid::from_u128(3)), 1.0);
    // Completed tasks keep their keys.
    assert_eq!(order_of(&applied, Uuid::from_u128(5)), 9.0);
    assert!(updates.iter().all(|u| u.task_uuid != Uuid::from_u128(5)));
}

#[test]
fn unscheduled_tasks_are_never_rewritten() {
    let mut inbox = Task::with_id(Uuid::from_u128(9), "Gym").unwrap();
    inbox.order = 42.0;

    let tasks = vec![day_task(1, "Gym", "2024-01-01", 0.0), inbox];

    assert!(reorder_all_tasks(&tasks, "2024-01-01", None, None).is_empty());
}

//! Template-day order propagation across date partitions.
//!
//! # Responsibility
//! - Re-derive every other scheduled partition's order from one template
//!   day, matching tasks by title.
//!
//! # Invariants
//! - Title matching is exact; no case or whitespace normalization.
//! - A duplicated title in the template ranks by its first occurrence.
//! - Unmatched tasks follow all matched tasks, keeping their prior
//!   relative order.
//! - The Unscheduled bucket is never rewritten.

use super::active_ascending;
use crate::model::task::{OrderUpdate, Task};
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Computes order updates that make every other scheduled partition mirror
/// the template day's relative ordering for shared titles.
///
/// `start_date`/`end_date` bound the set of rewritten partitions when
/// given (inclusive; ISO date strings compare lexicographically).
///
/// # Contract
/// - An empty template partition yields no updates.
/// - Rewritten partitions are re-keyed to `0, 1, 2, …` by position; an
///   update is emitted only where the computed key differs from the
///   current one, so applying the result and re-running yields nothing.
/// - Completed tasks are ignored on both the template day and the
///   rewritten days.
pub fn reorder_all_tasks(
    all_tasks: &[Task],
    template_date: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Vec<OrderUpdate> {
    let template = active_ascending(
        all_tasks
            .iter()
            .filter(|task| task.partition_key() == Some(template_date)),
    );
    if template.is_empty() {
        debug!(
            "event=reorder_propagate module=ordering status=skip reason=empty_template template_date={template_date}"
        );
        return Vec::new();
    }

    // First occurrence wins when the template day repeats a title.
    let mut template_rank: HashMap<&str, usize> = HashMap::new();
    for (rank, task) in template.iter().enumerate() {
        template_rank.entry(task.title.as_str()).or_insert(rank);
    }

    let mut partitions: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
    for task in all_tasks.iter().filter(|task| !task.completed) {
        let Some(date) = task.partition_key() else {
            continue;
        };
        if date == template_date {
            continue;
        }
        if start_date.is_some_and(|start| date < start) {
            continue;
        }
        if end_date.is_some_and(|end| date > end) {
            continue;
        }
        partitions.entry(date).or_default().push(task);
    }

    let mut updates = Vec::new();
    for mut tasks in partitions.into_values() {
        tasks.sort_by(|a, b| {
            let rank_a = resolve_rank(&template_rank, a);
            let rank_b = resolve_rank(&template_rank, b);
            rank_a
                .cmp(&rank_b)
                .then(a.order.total_cmp(&b.order))
                .then_with(|| a.uuid.cmp(&b.uuid))
        });
        for (position, task) in tasks.into_iter().enumerate() {
            let order = position as f64;
            if order != task.order {
                updates.push(OrderUpdate {
                    task_uuid: task.uuid,
                    order,
                });
            }
        }
    }
    updates
}

/// Tasks missing from the template sort after every matched task.
fn resolve_rank(template_rank: &HashMap<&str, usize>, task: &Task) -> usize {
    template_rank
        .get(task.title.as_str())
        .copied()
        .unwrap_or(usize::MAX)
}

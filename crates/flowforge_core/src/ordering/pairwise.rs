//! Single-slot move engine using midpoint interpolation.
//!
//! # Responsibility
//! - Compute the one new sort key that places a task one slot up or down
//!   among its incomplete siblings.
//!
//! # Invariants
//! - At most one `OrderUpdate` is produced; sibling keys never change.
//! - Unknown task ids and boundary moves yield an empty batch.

use super::{active_ascending, ORDER_GAP};
use crate::model::task::{MoveDirection, OrderUpdate, Task, TaskId};
use log::debug;

/// Computes the order update for moving one task a single slot.
///
/// `siblings` must already be scoped to one partition: one day's tasks, or
/// one parent's subtask list. Completed siblings are invisible both as
/// move candidates and as neighbors.
///
/// # Contract
/// - The moved task lands strictly between the target slot's neighbors;
///   a synthetic neighbor one gap away stands in at either edge.
/// - Repeated moves between the same neighbors halve the available gap
///   each time; precision loss is accepted and no rebalancing happens.
pub fn compute_move(
    task_uuid: TaskId,
    direction: MoveDirection,
    siblings: &[Task],
) -> Vec<OrderUpdate> {
    let active = active_ascending(siblings);
    let Some(index) = active.iter().position(|task| task.uuid == task_uuid) else {
        debug!(
            "event=reorder_move module=ordering status=skip reason=task_not_active task={task_uuid}"
        );
        return Vec::new();
    };

    let target_index = match direction {
        MoveDirection::Up => {
            if index == 0 {
                return Vec::new();
            }
            index - 1
        }
        MoveDirection::Down => {
            if index + 1 >= active.len() {
                return Vec::new();
            }
            index + 1
        }
    };
    let target = active[target_index];

    let order = match direction {
        MoveDirection::Up => {
            let before = target_index
                .checked_sub(1)
                .map(|i| active[i].order)
                .unwrap_or(target.order - ORDER_GAP);
            midpoint(before, target.order)
        }
        MoveDirection::Down => {
            let after = active
                .get(target_index + 1)
                .map(|task| task.order)
                .unwrap_or(target.order + ORDER_GAP);
            midpoint(target.order, after)
        }
    };

    vec![OrderUpdate { task_uuid, order }]
}

fn midpoint(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

//! Order-key allocation for newly created tasks.
//!
//! # Responsibility
//! - Assign end-of-list sort keys so new tasks land after every existing
//!   task in the set they are created into.
//!
//! # Invariants
//! - Allocated keys are strictly increasing across one batch.
//! - Each allocated key is strictly greater than every existing finite key.

use super::ORDER_GAP;
use crate::model::task::Task;

/// Returns end-of-list order keys for a batch of `batch_len` new tasks.
///
/// The maximum is taken over the whole provided set rather than per date
/// partition: new tasks always get end-of-list semantics, and one global
/// maximum satisfies that for every partition at once. For subtask
/// creation, pass the parent's subtask list instead.
///
/// # Contract
/// - Existing non-finite keys are ignored.
/// - An empty (or all non-finite) set allocates `0, GAP, 2*GAP, …`.
/// - Later batch members never force earlier ones to shift.
pub fn allocate_end_orders(existing: &[Task], batch_len: usize) -> Vec<f64> {
    let max = existing
        .iter()
        .map(|task| task.order)
        .filter(|order| order.is_finite())
        .fold(None, |acc: Option<f64>, order| {
            Some(acc.map_or(order, |current| current.max(order)))
        });

    match max {
        Some(max) => (0..batch_len)
            .map(|index| max + ORDER_GAP * (index as f64 + 1.0))
            .collect(),
        None => (0..batch_len).map(|index| ORDER_GAP * index as f64).collect(),
    }
}

/// Single-task convenience over [`allocate_end_orders`].
pub fn next_order(existing: &[Task]) -> f64 {
    allocate_end_orders(existing, 1).pop().unwrap_or(0.0)
}

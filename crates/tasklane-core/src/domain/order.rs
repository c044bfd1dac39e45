//! Order key allocation.
//!
//! Computes a fractional rank for a task being inserted into a column without
//! renumbering any other task. This is a pure function: neighbors in, key out.
//!
//! Keys are plain `f64`. Repeated midpoint insertions between the same two
//! neighbors halve the gap each time and eventually run out of precision.
//! Nothing here rebalances; `has_headroom` lets callers detect the collapse.

use super::task::Task;

/// Key given to the first task of an empty column.
pub const BASE_ORDER: f64 = 1000.0;

/// Distance used when extrapolating past either end of a column.
pub const ORDER_GAP: f64 = 1000.0;

/// Allocate a key for insertion at `index` among `neighbors`.
///
/// `neighbors` must already exclude the moving task and be sorted ascending;
/// `index` is clamped to `[0, len]`.
///
/// - empty: `BASE_ORDER`
/// - `index == 0`: `first - ORDER_GAP`
/// - `index >= len`: `last + ORDER_GAP`
/// - otherwise: midpoint of `neighbors[index - 1]` and `neighbors[index]`
pub fn allocate(neighbors: &[f64], index: usize) -> f64 {
    let sparse: Vec<Option<f64>> = neighbors.iter().copied().map(Some).collect();
    allocate_sparse(&sparse, index)
}

/// Same as [`allocate`], for neighbors whose recorded order may be absent.
///
/// An absent first order counts as `BASE_ORDER`, an absent predecessor or last
/// order counts as 0, and an absent successor is synthesised as
/// `predecessor + 2 * ORDER_GAP`.
pub fn allocate_sparse(neighbors: &[Option<f64>], index: usize) -> f64 {
    match neighbors {
        [] => BASE_ORDER,
        [first, ..] if index == 0 => first.unwrap_or(BASE_ORDER) - ORDER_GAP,
        [.., last] if index >= neighbors.len() => last.unwrap_or(0.0) + ORDER_GAP,
        _ => {
            let prev = neighbors[index - 1].unwrap_or(0.0);
            let next = neighbors[index].unwrap_or(prev + 2.0 * ORDER_GAP);
            midpoint(prev, next)
        }
    }
}

/// Allocate among tasks already sorted for display.
pub fn allocate_among(tasks: &[Task], index: usize) -> f64 {
    let orders: Vec<Option<f64>> = tasks.iter().map(|t| t.order).collect();
    allocate_sparse(&orders, index)
}

/// Whether a midpoint between `lo` and `hi` is still strictly between them.
pub fn has_headroom(lo: f64, hi: f64) -> bool {
    let mid = midpoint(lo, hi);
    lo < mid && mid < hi
}

fn midpoint(lo: f64, hi: f64) -> f64 {
    (lo + hi) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTask, TaskId};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    #[rstest]
    #[case::empty_column(&[], 0, 1000.0)]
    #[case::empty_column_any_index(&[], 3, 1000.0)]
    #[case::before_first(&[1000.0, 2000.0], 0, 0.0)]
    #[case::after_last(&[1000.0, 2000.0], 2, 3000.0)]
    #[case::past_the_end_clamps(&[1000.0, 2000.0], 9, 3000.0)]
    #[case::midpoint(&[1000.0, 3000.0], 1, 2000.0)]
    #[case::negative_keys(&[-500.0, -100.0], 1, -300.0)]
    fn allocates_expected_key(#[case] neighbors: &[f64], #[case] index: usize, #[case] expected: f64) {
        assert_eq!(allocate(neighbors, index), expected);
    }

    #[rstest]
    #[case::missing_first(&[None, Some(2000.0)], 0, 0.0)]
    #[case::missing_last(&[Some(1000.0), None], 2, 1000.0)]
    #[case::missing_successor(&[Some(1000.0), None], 1, 2000.0)]
    #[case::missing_predecessor(&[None, Some(3000.0)], 1, 1500.0)]
    fn absent_orders_are_synthesised(
        #[case] neighbors: &[Option<f64>],
        #[case] index: usize,
        #[case] expected: f64,
    ) {
        assert_eq!(allocate_sparse(neighbors, index), expected);
    }

    #[test]
    fn result_is_strictly_between_neighbors() {
        let mut rng = StdRng::seed_from_u64(0x7a5c);
        for _ in 0..500 {
            let len = rng.gen_range(0..12);
            let mut keys: Vec<f64> = Vec::with_capacity(len);
            let mut cursor = rng.gen_range(-10_000.0..10_000.0);
            for _ in 0..len {
                cursor += rng.gen_range(1.0..5_000.0);
                keys.push(cursor);
            }

            for index in 0..=len {
                let key = allocate(&keys, index);
                if index > 0 {
                    assert!(key > keys[index - 1], "{key} <= left at {index} in {keys:?}");
                }
                if index < len {
                    assert!(key < keys[index], "{key} >= right at {index} in {keys:?}");
                }
            }
        }
    }

    #[test]
    fn repeated_midpoints_eventually_lose_headroom() {
        let lo = 1000.0;
        let mut hi = 2000.0;
        let mut inserts = 0;
        while has_headroom(lo, hi) {
            hi = allocate(&[lo, hi], 1);
            inserts += 1;
        }
        // f64 has a 52-bit mantissa; the gap collapses well before 100 halvings.
        assert!(inserts > 30 && inserts < 100, "collapsed after {inserts}");
    }

    #[test]
    fn allocate_among_reads_task_orders() {
        let tasks = vec![
            NewTask::new("X", "doing").with_order(1000.0).into_task(TaskId::new("x")),
            NewTask::new("Y", "doing").with_order(2000.0).into_task(TaskId::new("y")),
        ];
        assert_eq!(allocate_among(&tasks, 2), 3000.0);
        assert_eq!(allocate_among(&tasks, 1), 1500.0);
        assert_eq!(allocate_among(&[], 0), BASE_ORDER);
    }
}

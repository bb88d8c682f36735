//! Folding a leaf value up its path into a root.
//!
//! `path`, `left` and `right` are aligned index for index, root-adjacent
//! first. At every step a left child is combined with its right sibling and
//! a right child with its left sibling; the unused sibling array entry is
//! never read.

use grovedb_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error_no_add};

use crate::{Combiner, Direction, IncrementalMerkleError, combiner::combine_counted};

fn check_lengths<const N: usize>(
    path: &[Direction],
    left: &[[u8; N]],
    right: &[[u8; N]],
) -> Result<(), IncrementalMerkleError> {
    if path.len() != left.len() || path.len() != right.len() {
        return Err(IncrementalMerkleError::LengthMismatch {
            path: path.len(),
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(())
}

/// Fold `seed` up `path`, recursing from the leaf end.
///
/// An empty path returns `seed` unchanged.
pub fn fold_path_recursive<C, const N: usize>(
    path: &[Direction],
    left: &[[u8; N]],
    right: &[[u8; N]],
    seed: [u8; N],
    combiner: &C,
) -> CostResult<[u8; N], IncrementalMerkleError>
where
    C: Combiner<N> + ?Sized,
{
    let mut cost = OperationCost::default();
    cost_return_on_error_no_add!(cost, check_lengths(path, left, right));
    let root = fold_step(path, left, right, seed, combiner, &mut cost);
    Ok(root).wrap_with_cost(cost)
}

fn fold_step<C, const N: usize>(
    path: &[Direction],
    left: &[[u8; N]],
    right: &[[u8; N]],
    seed: [u8; N],
    combiner: &C,
    cost: &mut OperationCost,
) -> [u8; N]
where
    C: Combiner<N> + ?Sized,
{
    let Some((direction, above)) = path.split_last() else {
        return seed;
    };
    let step = above.len();
    let node = match direction {
        Direction::Left => combine_counted(combiner, &seed, &right[step], cost),
        Direction::Right => combine_counted(combiner, &left[step], &seed, cost),
    };
    cost.levels_walked += 1;
    fold_step(above, &left[..step], &right[..step], node, combiner, cost)
}

/// Fold `seed` up `path` with an explicit loop from step `k - 1` down to 0.
///
/// Produces exactly the same value and cost as [`fold_path_recursive`].
pub fn fold_path_iterative<C, const N: usize>(
    path: &[Direction],
    left: &[[u8; N]],
    right: &[[u8; N]],
    seed: [u8; N],
    combiner: &C,
) -> CostResult<[u8; N], IncrementalMerkleError>
where
    C: Combiner<N> + ?Sized,
{
    let mut cost = OperationCost::default();
    cost_return_on_error_no_add!(cost, check_lengths(path, left, right));

    let mut node = seed;
    for step in (0..path.len()).rev() {
        node = match path[step] {
            Direction::Left => combine_counted(combiner, &node, &right[step], &mut cost),
            Direction::Right => combine_counted(combiner, &left[step], &node, &mut cost),
        };
        cost.levels_walked += 1;
    }
    Ok(node).wrap_with_cost(cost)
}

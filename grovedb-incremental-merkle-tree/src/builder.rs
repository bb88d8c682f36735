//! Replaying an append sequence through a [`Frontier`].

use grovedb_costs::{
    CostResult, CostsExt, OperationCost, cost_return_on_error, cost_return_on_error_no_add,
};

use crate::{
    Combiner, Frontier, IncrementalMerkleError, LeafPath, RightDefaults, fold_path_iterative,
    fold_path_recursive, path::capacity_for_height,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Iterative,
    Recursive,
}

/// Root of `leaves`, computed by inserting them one by one into a frontier
/// and folding the result.
///
/// Matches [`root_from_leaves`](crate::root_from_leaves) for every leaf count
/// from 0 to `2^height`, while each insertion only costs
/// `trailing_ones(index)` combiner calls.
pub fn build_root<C, const N: usize>(
    leaves: &[[u8; N]],
    defaults: &RightDefaults<N>,
    combiner: &C,
) -> CostResult<[u8; N], IncrementalMerkleError>
where
    C: Combiner<N> + ?Sized,
{
    build_root_walking(leaves, defaults, combiner, Walk::Iterative)
}

/// [`build_root`] using the recursive insertion and fold.
pub fn build_root_recursive<C, const N: usize>(
    leaves: &[[u8; N]],
    defaults: &RightDefaults<N>,
    combiner: &C,
) -> CostResult<[u8; N], IncrementalMerkleError>
where
    C: Combiner<N> + ?Sized,
{
    build_root_walking(leaves, defaults, combiner, Walk::Recursive)
}

fn build_root_walking<C, const N: usize>(
    leaves: &[[u8; N]],
    defaults: &RightDefaults<N>,
    combiner: &C,
    walk: Walk,
) -> CostResult<[u8; N], IncrementalMerkleError>
where
    C: Combiner<N> + ?Sized,
{
    let mut cost = OperationCost::default();
    let height = defaults.height();
    let capacity = capacity_for_height(height);
    let count = leaves.len() as u64;
    if count > capacity {
        return Err(IncrementalMerkleError::TreeFull { capacity, count }).wrap_with_cost(cost);
    }

    let mut frontier = cost_return_on_error_no_add!(
        cost,
        Frontier::new(height, *defaults.default_leaf())
    );
    let mut completed_root = None;
    for (index, leaf) in leaves.iter().enumerate() {
        let path = cost_return_on_error_no_add!(cost, LeafPath::of(index as u64, height));
        completed_root = match walk {
            Walk::Iterative => cost_return_on_error!(
                &mut cost,
                frontier.insert_iterative(&path, *leaf, combiner)
            ),
            Walk::Recursive => cost_return_on_error!(
                &mut cost,
                frontier.insert_recursive(&path, *leaf, combiner)
            ),
        };
    }

    let root = cost_return_on_error!(
        &mut cost,
        finalize_root(
            &frontier,
            count,
            completed_root,
            defaults,
            combiner,
            walk == Walk::Recursive
        )
    );
    Ok(root).wrap_with_cost(cost)
}

/// Fold the frontier into the root of a tree holding `count` leaves.
///
/// The fold walks the path of the next free position, taking left siblings
/// from the frontier and right siblings from the defaults. A full tree has
/// no next position; its root is the value carried out of the top level by
/// the last insertion.
pub(crate) fn finalize_root<C, const N: usize>(
    frontier: &Frontier<N>,
    count: u64,
    completed_root: Option<[u8; N]>,
    defaults: &RightDefaults<N>,
    combiner: &C,
    recursive: bool,
) -> CostResult<[u8; N], IncrementalMerkleError>
where
    C: Combiner<N> + ?Sized,
{
    let cost = OperationCost::default();
    let height = defaults.height();
    if count == capacity_for_height(height) {
        let root = cost_return_on_error_no_add!(
            cost,
            completed_root.ok_or_else(|| IncrementalMerkleError::InvalidData(
                "full tree without a completed root".to_string()
            ))
        );
        return Ok(root).wrap_with_cost(cost);
    }

    let next = cost_return_on_error_no_add!(cost, LeafPath::of(count, height));
    let directions = next.directions();
    let left = frontier.path_aligned();
    let right = defaults.path_aligned();
    let seed = *defaults.default_leaf();
    if recursive {
        fold_path_recursive(directions, left, right, seed, combiner)
    } else {
        fold_path_iterative(directions, left, right, seed, combiner)
    }
}

use grovedb_costs::{CostResult, CostsExt, OperationCost};

use crate::{
    Combiner, IncrementalMerkleError, RightDefaults, combiner::combine_counted,
    path::capacity_for_height,
};

/// Compute the root of `leaves` by hashing the tree level by level.
///
/// Odd levels are padded with the default subtree hash of that level, so
/// appending any number of default leaves never changes the result. This is
/// the reference the incremental computation is checked against; it costs
/// O(n) combiner calls.
///
/// Fails with [`IncrementalMerkleError::TreeFull`] if there are more than
/// `2^height` leaves.
pub fn root_from_leaves<C, const N: usize>(
    leaves: &[[u8; N]],
    defaults: &RightDefaults<N>,
    combiner: &C,
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

    // No leaves hashes the same as one default leaf.
    let mut nodes: Vec<[u8; N]> = if leaves.is_empty() {
        vec![*defaults.default_leaf()]
    } else {
        leaves.to_vec()
    };

    for level in 0..height {
        if nodes.len() % 2 == 1 {
            nodes.push(*defaults.at_level(level));
        }
        nodes = nodes
            .chunks_exact(2)
            .map(|pair| combine_counted(combiner, &pair[0], &pair[1], &mut cost))
            .collect();
        cost.levels_walked += 1;
    }

    Ok(nodes[0]).wrap_with_cost(cost)
}

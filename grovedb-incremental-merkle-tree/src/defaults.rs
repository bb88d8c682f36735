//! Hashes of all-default subtrees, one per level.

use grovedb_costs::{CostContext, CostResult, CostsExt, OperationCost};

use crate::{
    Combiner, IncrementalMerkleError,
    combiner::combine_counted,
    path::validate_height,
};

/// `right[0] = default_leaf`, `right[i] = combine(right[i-1], right[i-1])`.
///
/// `right[i]` is the root of a perfect subtree of height `i` whose leaves are
/// all the default leaf. It stands in for every right sibling that has not
/// been filled yet. Computed once per combiner and never mutated, so it can
/// be shared (e.g. behind an `Arc`) by any number of trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RightDefaults<const N: usize> {
    /// Indexed by level, leaf level first.
    by_level: Vec<[u8; N]>,
    /// Same values, root-adjacent level first, aligned with [`LeafPath`].
    ///
    /// [`LeafPath`]: crate::LeafPath
    path_aligned: Vec<[u8; N]>,
}

impl<const N: usize> RightDefaults<N> {
    /// Compute the defaults of a tree of `height` with `height - 1` combiner
    /// calls.
    pub fn compute<C>(
        height: u8,
        default_leaf: [u8; N],
        combiner: &C,
    ) -> CostResult<Self, IncrementalMerkleError>
    where
        C: Combiner<N> + ?Sized,
    {
        let mut cost = OperationCost::default();
        if let Err(e) = validate_height(height) {
            return Err(e).wrap_with_cost(cost);
        }

        let mut by_level = Vec::with_capacity(height as usize);
        by_level.push(default_leaf);
        for level in 1..height as usize {
            let below = &by_level[level - 1];
            let node = combine_counted(combiner, below, below, &mut cost);
            by_level.push(node);
        }
        let path_aligned = by_level.iter().rev().copied().collect();

        Ok(Self {
            by_level,
            path_aligned,
        })
        .wrap_with_cost(cost)
    }

    /// Height of the tree these defaults belong to.
    pub fn height(&self) -> u8 {
        self.by_level.len() as u8
    }

    /// The empty leaf value, `right[0]`.
    pub fn default_leaf(&self) -> &[u8; N] {
        &self.by_level[0]
    }

    /// Default subtree hash at `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= height`.
    pub fn at_level(&self, level: u8) -> &[u8; N] {
        &self.by_level[level as usize]
    }

    /// All defaults, leaf level first.
    pub fn by_level(&self) -> &[[u8; N]] {
        &self.by_level
    }

    /// All defaults, root-adjacent level first.
    pub fn path_aligned(&self) -> &[[u8; N]] {
        &self.path_aligned
    }

    /// Root of a tree holding no leaves at all.
    pub fn empty_root<C>(&self, combiner: &C) -> CostContext<[u8; N]>
    where
        C: Combiner<N> + ?Sized,
    {
        let mut cost = OperationCost::default();
        let top = &self.by_level[self.by_level.len() - 1];
        let root = combine_counted(combiner, top, top, &mut cost);
        root.wrap_with_cost(cost)
    }
}

/// Compute [`RightDefaults`] for `height`, using `default_leaf` as the empty
/// leaf value.
pub fn compute_right_defaults<C, const N: usize>(
    height: u8,
    default_leaf: [u8; N],
    combiner: &C,
) -> CostResult<RightDefaults<N>, IncrementalMerkleError>
where
    C: Combiner<N> + ?Sized,
{
    RightDefaults::compute(height, default_leaf, combiner)
}

//! The incremental accumulator: one pending left sibling per level.

use grovedb_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error_no_add};

use crate::{
    Combiner, Direction, IncrementalMerkleError, LeafPath, combiner::combine_counted,
    path::validate_height,
};

/// Most recent left sibling at every level that no right sibling has
/// consumed yet.
///
/// Slots are stored root-adjacent first so they line up with
/// [`LeafPath::directions`] and can be passed straight to the fold as the
/// left sibling array. Use [`Frontier::at_level`] / [`Frontier::levels`] for
/// level-indexed access.
///
/// Only the slots at and above the level where the latest insertion stopped
/// are meaningful. Slots below that point are stale until overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontier<const N: usize> {
    slots: Vec<[u8; N]>,
}

impl<const N: usize> Frontier<N> {
    /// A frontier of `height` slots all holding `default_leaf`.
    pub fn new(height: u8, default_leaf: [u8; N]) -> Result<Self, IncrementalMerkleError> {
        validate_height(height)?;
        Ok(Self {
            slots: vec![default_leaf; height as usize],
        })
    }

    /// Rebuild a frontier from its level-ordered slots (leaf level first).
    pub fn from_levels(levels: Vec<[u8; N]>) -> Result<Self, IncrementalMerkleError> {
        let height = u8::try_from(levels.len())
            .map_err(|_| IncrementalMerkleError::InvalidHeight(u8::MAX))?;
        validate_height(height)?;
        let mut slots = levels;
        slots.reverse();
        Ok(Self { slots })
    }

    /// Number of levels tracked.
    pub fn height(&self) -> u8 {
        self.slots.len() as u8
    }

    /// Slot at `level` (0 = leaf level).
    ///
    /// # Panics
    ///
    /// Panics if `level >= height`.
    pub fn at_level(&self, level: u8) -> &[u8; N] {
        &self.slots[self.slots.len() - 1 - level as usize]
    }

    /// Slots in level order, leaf level first.
    pub fn levels(&self) -> impl Iterator<Item = &[u8; N]> {
        self.slots.iter().rev()
    }

    /// Slots root-adjacent first, aligned with [`LeafPath::directions`].
    pub fn path_aligned(&self) -> &[[u8; N]] {
        &self.slots
    }

    fn check_path(&self, path: &LeafPath) -> Result<(), IncrementalMerkleError> {
        if path.directions().len() != self.slots.len() {
            return Err(IncrementalMerkleError::LengthMismatch {
                path: path.directions().len(),
                left: self.slots.len(),
                right: self.slots.len(),
            });
        }
        Ok(())
    }

    /// Insert `seed` as the leaf at `path`, walking up with an explicit loop.
    ///
    /// While the node is a right child it is combined with the pending left
    /// sibling and carried one level up. The walk stops at the first left
    /// child, whose value becomes the new slot. Returns `Some(root)` only
    /// when the carry leaves the top level, i.e. the insertion filled the
    /// tree. Costs `trailing_ones(index)` combiner calls.
    pub fn insert_iterative<C>(
        &mut self,
        path: &LeafPath,
        seed: [u8; N],
        combiner: &C,
    ) -> CostResult<Option<[u8; N]>, IncrementalMerkleError>
    where
        C: Combiner<N> + ?Sized,
    {
        let mut cost = OperationCost::default();
        cost_return_on_error_no_add!(cost, self.check_path(path));

        let directions = path.directions();
        let mut node = seed;
        for step in (0..directions.len()).rev() {
            cost.levels_walked += 1;
            match directions[step] {
                Direction::Left => {
                    self.slots[step] = node;
                    return Ok(None).wrap_with_cost(cost);
                }
                Direction::Right => {
                    node = combine_counted(combiner, &self.slots[step], &node, &mut cost);
                }
            }
        }
        Ok(Some(node)).wrap_with_cost(cost)
    }

    /// Same walk as [`Frontier::insert_iterative`], expressed recursively.
    pub fn insert_recursive<C>(
        &mut self,
        path: &LeafPath,
        seed: [u8; N],
        combiner: &C,
    ) -> CostResult<Option<[u8; N]>, IncrementalMerkleError>
    where
        C: Combiner<N> + ?Sized,
    {
        let mut cost = OperationCost::default();
        cost_return_on_error_no_add!(cost, self.check_path(path));
        let completed = insert_step(
            &mut self.slots,
            path.directions(),
            seed,
            combiner,
            &mut cost,
        );
        Ok(completed).wrap_with_cost(cost)
    }
}

fn insert_step<C, const N: usize>(
    slots: &mut [[u8; N]],
    directions: &[Direction],
    seed: [u8; N],
    combiner: &C,
    cost: &mut OperationCost,
) -> Option<[u8; N]>
where
    C: Combiner<N> + ?Sized,
{
    let (Some((direction, upper_directions)), Some((slot, upper_slots))) =
        (directions.split_last(), slots.split_last_mut())
    else {
        return Some(seed);
    };
    cost.levels_walked += 1;
    match direction {
        Direction::Left => {
            *slot = seed;
            None
        }
        Direction::Right => {
            let node = combine_counted(combiner, slot, &seed, cost);
            insert_step(upper_slots, upper_directions, node, combiner, cost)
        }
    }
}

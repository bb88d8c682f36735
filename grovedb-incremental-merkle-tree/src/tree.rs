use std::{cell::Cell, sync::Arc};

use grovedb_costs::{
    CostResult, CostsExt, OperationCost, cost_return_on_error, cost_return_on_error_no_add,
};
use tracing::{debug, trace};

use crate::{
    Combiner, Frontier, FrontierState, HASH_SIZE, IncrementalMerkleError, LeafPath, RightDefaults,
    builder::finalize_root,
    path::{capacity_for_height, validate_height},
};

/// Incremental tree hashed with [`Blake3Combiner`](crate::Blake3Combiner).
pub type Blake3MerkleTree = IncrementalMerkleTree<crate::Blake3Combiner, HASH_SIZE>;

/// An append-only Merkle tree of fixed height.
///
/// Only the [`Frontier`] (one hash per level) and the leaf count are kept;
/// leaves themselves are never stored. Appending costs
/// `trailing_ones(position)` combiner calls, reading the root costs `height`
/// calls the first time after an append and nothing afterwards.
///
/// A tree is driven by a single writer. Trees built with
/// [`IncrementalMerkleTree::with_defaults`] share one read-only
/// [`RightDefaults`] table.
#[derive(Debug, Clone)]
pub struct IncrementalMerkleTree<C, const N: usize = HASH_SIZE> {
    combiner: C,
    defaults: Arc<RightDefaults<N>>,
    frontier: Frontier<N>,
    count: u64,
    completed_root: Option<[u8; N]>,
    cached_root: Cell<Option<[u8; N]>>,
}

impl<C: Combiner<N>, const N: usize> IncrementalMerkleTree<C, N> {
    /// Create an empty tree whose empty leaf is all zero bytes.
    pub fn new(height: u8, combiner: C) -> Result<Self, IncrementalMerkleError> {
        Self::with_default_leaf(height, [0u8; N], combiner)
    }

    /// Create an empty tree with a custom empty leaf value.
    pub fn with_default_leaf(
        height: u8,
        default_leaf: [u8; N],
        combiner: C,
    ) -> Result<Self, IncrementalMerkleError> {
        let defaults = RightDefaults::compute(height, default_leaf, &combiner).unwrap()?;
        Self::with_defaults(Arc::new(defaults), combiner)
    }

    /// Create an empty tree reusing precomputed defaults.
    ///
    /// `defaults` must have been computed with the same combiner.
    pub fn with_defaults(
        defaults: Arc<RightDefaults<N>>,
        combiner: C,
    ) -> Result<Self, IncrementalMerkleError> {
        let frontier = Frontier::new(defaults.height(), *defaults.default_leaf())?;
        Ok(Self {
            combiner,
            defaults,
            frontier,
            count: 0,
            completed_root: None,
            cached_root: Cell::new(None),
        })
    }

    /// Maximum number of leaves, `2^height`.
    pub fn capacity(&self) -> u64 {
        capacity_for_height(self.height())
    }

    /// Number of leaves appended so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Height of the tree.
    pub fn height(&self) -> u8 {
        self.defaults.height()
    }

    /// Returns `true` if nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` once `2^height` leaves have been appended.
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// The current frontier.
    pub fn frontier(&self) -> &Frontier<N> {
        &self.frontier
    }

    /// The shared default subtree hashes.
    pub fn right_defaults(&self) -> &Arc<RightDefaults<N>> {
        &self.defaults
    }

    /// Append a leaf at the next free position.
    ///
    /// Returns the 0-based position the leaf was written to. Fails with
    /// [`IncrementalMerkleError::TreeFull`] without touching the frontier
    /// when the tree is full.
    pub fn append(&mut self, leaf: [u8; N]) -> CostResult<u64, IncrementalMerkleError> {
        let mut cost = OperationCost::default();
        let capacity = self.capacity();
        if self.count >= capacity {
            return Err(IncrementalMerkleError::TreeFull {
                capacity,
                count: self.count,
            })
            .wrap_with_cost(cost);
        }

        let position = self.count;
        let path = cost_return_on_error_no_add!(cost, LeafPath::of(position, self.height()));
        let completed = cost_return_on_error!(
            &mut cost,
            self.frontier.insert_iterative(&path, leaf, &self.combiner)
        );

        self.count += 1;
        self.cached_root.set(None);
        trace!(
            position,
            carries = cost.hash_node_calls,
            "appended leaf to incremental merkle tree"
        );
        if let Some(root) = completed {
            debug!(
                capacity,
                root = %hex::encode(root),
                "incremental merkle tree filled"
            );
            self.completed_root = Some(root);
        }
        Ok(position).wrap_with_cost(cost)
    }

    /// Append every leaf of `leaves` in order, stopping at the first error.
    ///
    /// Returns the position of the last appended leaf, or `None` if `leaves`
    /// is empty. Capacity is checked up front, so a batch that would
    /// overflow leaves the tree untouched.
    pub fn extend<'a, I>(&mut self, leaves: I) -> CostResult<Option<u64>, IncrementalMerkleError>
    where
        I: IntoIterator<Item = &'a [u8; N]>,
        I::IntoIter: ExactSizeIterator,
    {
        let mut cost = OperationCost::default();
        let leaves = leaves.into_iter();
        let capacity = self.capacity();
        let wanted = self.count.saturating_add(leaves.len() as u64);
        if wanted > capacity {
            return Err(IncrementalMerkleError::TreeFull {
                capacity,
                count: wanted,
            })
            .wrap_with_cost(cost);
        }

        let mut last = None;
        for leaf in leaves {
            last = Some(cost_return_on_error!(&mut cost, self.append(*leaf)));
        }
        Ok(last).wrap_with_cost(cost)
    }

    /// Current root.
    ///
    /// The result is cached until the next append; a cached read costs
    /// nothing. An empty tree yields the root of an all-default tree.
    pub fn root(&self) -> CostResult<[u8; N], IncrementalMerkleError> {
        let mut cost = OperationCost::default();
        if let Some(root) = self.cached_root.get() {
            return Ok(root).wrap_with_cost(cost);
        }
        let root = cost_return_on_error!(
            &mut cost,
            finalize_root(
                &self.frontier,
                self.count,
                self.completed_root,
                &self.defaults,
                &self.combiner,
                false,
            )
        );
        self.cached_root.set(Some(root));
        Ok(root).wrap_with_cost(cost)
    }

    /// Snapshot of the resumable state.
    pub fn to_state(&self) -> FrontierState<N> {
        FrontierState {
            height: self.height(),
            count: self.count,
            default_leaf: *self.defaults.default_leaf(),
            frontier: self.frontier.levels().copied().collect(),
            completed_root: self.completed_root,
        }
    }

    /// Resume a tree from a snapshot taken by [`IncrementalMerkleTree::to_state`].
    pub fn from_state(
        state: FrontierState<N>,
        combiner: C,
    ) -> Result<Self, IncrementalMerkleError> {
        validate_height(state.height)?;
        let defaults =
            RightDefaults::compute(state.height, state.default_leaf, &combiner).unwrap()?;
        Self::from_state_with_defaults(state, Arc::new(defaults), combiner)
    }

    /// Resume a tree from a snapshot, reusing precomputed defaults.
    pub fn from_state_with_defaults(
        state: FrontierState<N>,
        defaults: Arc<RightDefaults<N>>,
        combiner: C,
    ) -> Result<Self, IncrementalMerkleError> {
        validate_height(state.height)?;
        if state.height != defaults.height() {
            return Err(IncrementalMerkleError::InvalidData(format!(
                "state height {} does not match defaults height {}",
                state.height,
                defaults.height()
            )));
        }
        if state.default_leaf != *defaults.default_leaf() {
            return Err(IncrementalMerkleError::InvalidData(
                "state default leaf does not match defaults".to_string(),
            ));
        }
        let capacity = capacity_for_height(state.height);
        if state.count > capacity {
            return Err(IncrementalMerkleError::InvalidData(format!(
                "count {} exceeds capacity {} for height {}",
                state.count, capacity, state.height
            )));
        }
        if state.frontier.len() != state.height as usize {
            return Err(IncrementalMerkleError::InvalidData(format!(
                "frontier has {} levels, expected {}",
                state.frontier.len(),
                state.height
            )));
        }
        if (state.count == capacity) != state.completed_root.is_some() {
            return Err(IncrementalMerkleError::InvalidData(
                "completed root must be present exactly when the tree is full".to_string(),
            ));
        }

        let frontier = Frontier::from_levels(state.frontier)?;
        debug!(
            height = state.height,
            count = state.count,
            "restored incremental merkle tree from state"
        );
        Ok(Self {
            combiner,
            defaults,
            frontier,
            count: state.count,
            completed_root: state.completed_root,
            cached_root: Cell::new(None),
        })
    }

    /// Serialize the resumable state to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>, IncrementalMerkleError> {
        self.to_state().to_bytes()
    }

    /// Resume a tree from bytes produced by [`IncrementalMerkleTree::serialize`].
    pub fn deserialize(bytes: &[u8], combiner: C) -> Result<Self, IncrementalMerkleError> {
        Self::from_state(FrontierState::from_bytes(bytes)?, combiner)
    }
}

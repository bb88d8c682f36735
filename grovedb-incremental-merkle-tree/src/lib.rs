//! Fixed-height append-only Merkle tree.
//!
//! Leaves are appended strictly in order. Instead of rehashing the whole
//! leaf set, every append updates a [`Frontier`] of one pending left sibling
//! per level, the same way a binary counter propagates a carry. The root is
//! materialised on demand by folding the frontier together with the
//! precomputed [`RightDefaults`] (hashes of all-default subtrees):
//!
//! ```text
//!                 root                    level H
//!            /            \
//!         F[H-1]        default           ...
//!        /     \
//!     ...      ...                        level 1
//!    /   \    /   \
//!   l0   l1  l2  (next)                   level 0
//! ```
//!
//! The hash function is injected through the [`Combiner`] trait; a Blake3
//! implementation is provided as [`Blake3Combiner`].
//!
//! Two reference computations are exposed alongside the incremental one:
//! [`root_from_leaves`] rebuilds the tree level by level, and
//! [`build_root`] / [`build_root_recursive`] replay an append sequence.
//! All of them agree on every leaf count from 0 to `2^height`.

#![warn(missing_docs)]

mod batch;
mod builder;
mod combiner;
mod defaults;
mod error;
mod fold;
mod frontier;
mod path;
mod state;
mod tree;

#[cfg(test)]
mod tests;

pub use batch::root_from_leaves;
pub use builder::{build_root, build_root_recursive};
pub use combiner::{Blake3Combiner, Combiner, HASH_SIZE};
pub use defaults::{RightDefaults, compute_right_defaults};
pub use error::IncrementalMerkleError;
pub use fold::{fold_path_iterative, fold_path_recursive};
pub use frontier::Frontier;
pub use grovedb_costs::{CostContext, CostResult, CostsExt, OperationCost};
pub use path::{
    DEFAULT_HEIGHT, Direction, LeafPath, MAX_HEIGHT, MIN_HEIGHT, capacity_for_height, path_of,
};
pub use state::FrontierState;
pub use tree::{Blake3MerkleTree, IncrementalMerkleTree};

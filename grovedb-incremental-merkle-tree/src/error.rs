use thiserror::Error;

use crate::path::{MAX_HEIGHT, MIN_HEIGHT};

/// Errors from incremental Merkle tree operations.
///
/// Every variant is a validation failure raised before the combiner is
/// called or any frontier is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncrementalMerkleError {
    #[error("height must be between {min} and {max}, got {0}", min = MIN_HEIGHT, max = MAX_HEIGHT)]
    InvalidHeight(u8),
    #[error("leaf index {index} is out of range (capacity {capacity})")]
    IndexOutOfRange { index: u64, capacity: u64 },
    #[error("tree is full (capacity {capacity}, count {count})")]
    TreeFull { capacity: u64, count: u64 },
    #[error("length mismatch: path {path}, left siblings {left}, right siblings {right}")]
    LengthMismatch {
        path: usize,
        left: usize,
        right: usize,
    },
    #[error("invalid data: {0}")]
    InvalidData(String),
}

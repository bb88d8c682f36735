//! Leaf index to root-to-leaf path encoding.

use crate::IncrementalMerkleError;

/// Smallest supported tree height.
pub const MIN_HEIGHT: u8 = 1;
/// Largest supported tree height. Leaf counts up to `2^63` fit in a `u64`.
pub const MAX_HEIGHT: u8 = 63;
/// Height used when the caller has no reason to pick another one.
pub const DEFAULT_HEIGHT: u8 = 32;

/// Validate that height is in the allowed range [`MIN_HEIGHT`, `MAX_HEIGHT`].
pub(crate) fn validate_height(height: u8) -> Result<(), IncrementalMerkleError> {
    if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&height) {
        return Err(IncrementalMerkleError::InvalidHeight(height));
    }
    Ok(())
}

/// Number of leaves a tree of `height` holds, `2^height`.
///
/// Height must already be validated.
pub fn capacity_for_height(height: u8) -> u64 {
    1u64 << height
}

/// Which child of its parent a node on a path is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left child (bit 0). The sibling, if any, lies to the right.
    Left,
    /// Right child (bit 1). The sibling lies to the left.
    Right,
}

impl Direction {
    /// Direction encoded by the lowest bit of `bits`.
    pub fn from_bit(bits: u64) -> Self {
        if bits & 1 == 0 {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    /// `0` for [`Direction::Left`], `1` for [`Direction::Right`].
    pub fn bit(self) -> u8 {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
        }
    }
}

/// Root-to-leaf path of a leaf position.
///
/// `directions()[0]` is the node just below the root (level `height - 1`)
/// and the last entry is the leaf itself (level 0). Read as a big-endian
/// bit string the path is the leaf index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeafPath {
    directions: Vec<Direction>,
}

impl LeafPath {
    /// Path of leaf `index` in a tree of `height`.
    ///
    /// Fails with [`IncrementalMerkleError::IndexOutOfRange`] when
    /// `index >= 2^height`.
    pub fn of(index: u64, height: u8) -> Result<Self, IncrementalMerkleError> {
        validate_height(height)?;
        let capacity = capacity_for_height(height);
        if index >= capacity {
            return Err(IncrementalMerkleError::IndexOutOfRange { index, capacity });
        }

        let mut directions = vec![Direction::Left; height as usize];
        let mut remaining = index;
        // Remainders come out deepest level first.
        for direction in directions.iter_mut().rev() {
            *direction = Direction::from_bit(remaining);
            remaining >>= 1;
        }
        Ok(Self { directions })
    }

    /// Build a path from root-first directions.
    pub fn from_directions(directions: Vec<Direction>) -> Result<Self, IncrementalMerkleError> {
        let height = u8::try_from(directions.len())
            .map_err(|_| IncrementalMerkleError::InvalidHeight(u8::MAX))?;
        validate_height(height)?;
        Ok(Self { directions })
    }

    /// Number of levels on the path.
    pub fn height(&self) -> u8 {
        self.directions.len() as u8
    }

    /// Root-first directions.
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Direction of the path node sitting at `level` (0 = leaf level).
    ///
    /// # Panics
    ///
    /// Panics if `level >= height`.
    pub fn at_level(&self, level: u8) -> Direction {
        self.directions[self.directions.len() - 1 - level as usize]
    }

    /// Root-first bits, `0` for left and `1` for right.
    pub fn bits(&self) -> Vec<u8> {
        self.directions.iter().map(|d| d.bit()).collect()
    }

    /// Recover the leaf index this path leads to.
    pub fn to_index(&self) -> u64 {
        self.directions
            .iter()
            .fold(0u64, |acc, d| (acc << 1) | u64::from(d.bit()))
    }
}

/// Root-to-leaf path of leaf `index` in a tree of `height`.
///
/// Shorthand for [`LeafPath::of`].
pub fn path_of(index: u64, height: u8) -> Result<LeafPath, IncrementalMerkleError> {
    LeafPath::of(index, height)
}

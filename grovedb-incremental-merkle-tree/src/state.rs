//! Persistable snapshot of an incremental tree.
//!
//! Encoded with bincode's standard configuration:
//!
//! ```text
//! height:         u8
//! count:          u64 (varint)
//! default_leaf:   [u8; N]
//! frontier:       len (varint) + len × [u8; N], leaf level first
//! completed_root: Option<[u8; N]> (present iff count == 2^height)
//! ```

use bincode::{
    Decode, Encode,
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
};

use crate::{IncrementalMerkleError, MAX_HEIGHT};

/// Upper bound on the bytes bincode may claim while decoding a state.
const STATE_DECODE_LIMIT: usize = 100 * 1024 * 1024;

/// Everything needed to resume appending: the frontier and the leaf count.
///
/// The count fixes the path of the next insertion, so no leaf data has to be
/// kept around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierState<const N: usize> {
    /// Height of the tree (capacity = 2^height).
    pub height: u8,
    /// Number of leaves appended so far.
    pub count: u64,
    /// Value of an empty leaf.
    pub default_leaf: [u8; N],
    /// Frontier slots indexed by level, leaf level first.
    pub frontier: Vec<[u8; N]>,
    /// Root carried out of the top level once the tree filled up.
    pub completed_root: Option<[u8; N]>,
}

impl<const N: usize> Encode for FrontierState<N> {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.height.encode(encoder)?;
        self.count.encode(encoder)?;
        self.default_leaf.encode(encoder)?;
        self.frontier.encode(encoder)?;
        self.completed_root.encode(encoder)
    }
}

impl<Context, const N: usize> Decode<Context> for FrontierState<N> {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        Ok(Self {
            height: Decode::decode(decoder)?,
            count: Decode::decode(decoder)?,
            default_leaf: Decode::decode(decoder)?,
            frontier: decode_frontier(decoder)?,
            completed_root: Decode::decode(decoder)?,
        })
    }
}

/// Decodes the frontier vector, refusing length prefixes no tree can have
/// before anything is allocated.
fn decode_frontier<D: Decoder, const N: usize>(
    decoder: &mut D,
) -> Result<Vec<[u8; N]>, DecodeError> {
    let len = u64::decode(decoder)?;
    if len > u64::from(MAX_HEIGHT) {
        return Err(DecodeError::OtherString(format!(
            "frontier of {} slots exceeds max height {}",
            len, MAX_HEIGHT
        )));
    }
    (0..len).map(|_| <[u8; N]>::decode(decoder)).collect()
}

impl<const N: usize> FrontierState<N> {
    /// Longest encoding a valid state can have: height, a full varint count,
    /// the default leaf, a full frontier and a completed root.
    pub fn max_encoded_len() -> usize {
        1 + 9 + N + 9 + usize::from(MAX_HEIGHT) * N + 1 + N
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, IncrementalMerkleError> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| IncrementalMerkleError::InvalidData(format!("encode state: {}", e)))
    }

    /// Deserialize from bytes produced by [`FrontierState::to_bytes`].
    ///
    /// Trailing bytes, inputs longer than [`FrontierState::max_encoded_len`]
    /// and frontier lengths above [`MAX_HEIGHT`] are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IncrementalMerkleError> {
        if bytes.len() > Self::max_encoded_len() {
            return Err(IncrementalMerkleError::InvalidData(format!(
                "state of {} bytes exceeds max encoded length {}",
                bytes.len(),
                Self::max_encoded_len()
            )));
        }
        let config = bincode::config::standard().with_limit::<STATE_DECODE_LIMIT>();
        let (state, read): (Self, usize) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| IncrementalMerkleError::InvalidData(format!("decode state: {}", e)))?;
        if read != bytes.len() {
            return Err(IncrementalMerkleError::InvalidData(format!(
                "{} trailing bytes after state",
                bytes.len() - read
            )));
        }
        Ok(state)
    }
}

//! Hash combination used for every internal node.

use grovedb_costs::OperationCost;

/// Width in bytes of the hashes produced by [`Blake3Combiner`].
pub const HASH_SIZE: usize = 32;

/// Combines a left and a right child hash into their parent hash.
///
/// Implementations must be deterministic and must not assume commutativity:
/// `combine(a, b)` and `combine(b, a)` are different nodes. Any
/// `Fn(&[u8; N], &[u8; N]) -> [u8; N]` closure is a combiner.
pub trait Combiner<const N: usize> {
    /// Hash `left || right` into a parent node.
    fn combine(&self, left: &[u8; N], right: &[u8; N]) -> [u8; N];
}

impl<F, const N: usize> Combiner<N> for F
where
    F: Fn(&[u8; N], &[u8; N]) -> [u8; N],
{
    fn combine(&self, left: &[u8; N], right: &[u8; N]) -> [u8; N] {
        self(left, right)
    }
}

/// `blake3(left || right)` over 32-byte hashes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Blake3Combiner;

impl Combiner<HASH_SIZE> for Blake3Combiner {
    fn combine(&self, left: &[u8; HASH_SIZE], right: &[u8; HASH_SIZE]) -> [u8; HASH_SIZE] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(left);
        hasher.update(right);
        *hasher.finalize().as_bytes()
    }
}

/// Combine two nodes and record the call in `cost`.
pub(crate) fn combine_counted<C, const N: usize>(
    combiner: &C,
    left: &[u8; N],
    right: &[u8; N],
    cost: &mut OperationCost,
) -> [u8; N]
where
    C: Combiner<N> + ?Sized,
{
    cost.hash_node_calls += 1;
    combiner.combine(left, right)
}

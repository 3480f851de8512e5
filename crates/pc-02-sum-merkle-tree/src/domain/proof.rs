//! # Sum Merkle Proofs
//!
//! Stateless verification of a leaf's window against a root. The verifier
//! walks the proof from leaf to root, tracking the running subtree length and
//! the window bounds `[left, right)` the subtree can occupy.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::keccak256_concat;
use shared_types::{u256_to_be32, Hash, Segment, U256};

use super::node::PROOF_ENTRY_LEN;

/// Proof that `leaf` occupies `segment` in a tree over `num_tokens` tokens.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumMerkleProof {
    /// Listed tokens when the tree was built (total = `num_tokens * 2^48`).
    pub num_tokens: u64,
    /// Leaf index.
    pub index: usize,
    /// Leaf window in the global coin space.
    pub segment: Segment,
    /// Leaf hash.
    pub leaf: Hash,
    /// Concatenated 41-byte entries.
    #[serde_as(as = "Bytes")]
    pub proof: Vec<u8>,
}

impl SumMerkleProof {
    /// Verify this proof's own window against `root`.
    pub fn verify(&self, root: &Hash, total: U256) -> bool {
        verify(
            self.segment.start(),
            self.segment.end(),
            &self.leaf,
            total,
            root,
            &self.proof,
        )
    }
}

/// Verify that `leaf` with window `[start, end)` hangs under `root`, whose total
/// length is `total`.
///
/// Returns `false` for any malformed input; never panics.
pub fn verify(start: U256, end: U256, leaf: &Hash, total: U256, root: &Hash, proof: &[u8]) -> bool {
    if proof.len() % PROOF_ENTRY_LEN != 0 {
        return false;
    }
    let Some(mut amount) = end.checked_sub(start) else {
        return false;
    };
    let mut left = U256::zero();
    let mut right = total;
    let mut hash = *leaf;

    for entry in proof.chunks_exact(PROOF_ENTRY_LEN) {
        let side = entry[0];
        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&entry[1..9]);
        let len = U256::from(u64::from_be_bytes(len_bytes));
        let sibling = &entry[9..];

        if side == 0 {
            hash = keccak256_concat(&[
                &u256_to_be32(amount)[..],
                &hash[..],
                &u256_to_be32(len)[..],
                sibling,
            ]);
            right = match right.checked_sub(len) {
                Some(value) => value,
                None => return false,
            };
        } else {
            hash = keccak256_concat(&[
                &u256_to_be32(len)[..],
                sibling,
                &u256_to_be32(amount)[..],
                &hash[..],
            ]);
            left = match left.checked_add(len) {
                Some(value) => value,
                None => return false,
            };
        }
        amount = match amount.checked_add(len) {
            Some(value) => value,
            None => return false,
        };
    }

    hash == *root && amount == total && left <= start && right >= end
}

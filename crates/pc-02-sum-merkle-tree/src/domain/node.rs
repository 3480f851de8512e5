//! Tree node: hash plus the total coin length beneath it.

use serde::{Deserialize, Serialize};
use shared_crypto::keccak256_concat;
use shared_types::{u256_to_be32, Hash, U256, ZERO_HASH};

use super::errors::TreeError;

/// Size of one proof entry: side (1) + length (8) + hash (32).
pub const PROOF_ENTRY_LEN: usize = 41;

/// A node of the sum Merkle tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumMerkleTreeNode {
    /// Node hash.
    pub hash: Hash,
    /// Sum of leaf lengths below this node.
    pub length: U256,
}

impl SumMerkleTreeNode {
    /// Create a node.
    pub fn new(hash: Hash, length: U256) -> Self {
        Self { hash, length }
    }

    /// Padding node: zero hash, zero length.
    pub fn empty() -> Self {
        Self {
            hash: ZERO_HASH,
            length: U256::zero(),
        }
    }

    /// Combine two children into their parent.
    pub fn parent(left: &Self, right: &Self) -> Self {
        let hash = keccak256_concat(&[
            &u256_to_be32(left.length)[..],
            &left.hash[..],
            &u256_to_be32(right.length)[..],
            &right.hash[..],
        ]);
        Self {
            hash,
            length: left.length + right.length,
        }
    }

    /// Encode this node as a proof entry for a sibling on `side`.
    pub fn to_proof_entry(&self, side: u8) -> Result<[u8; PROOF_ENTRY_LEN], TreeError> {
        if self.length > U256::from(u64::MAX) {
            return Err(TreeError::LengthOverflow);
        }
        let mut entry = [0u8; PROOF_ENTRY_LEN];
        entry[0] = side;
        entry[1..9].copy_from_slice(&self.length.low_u64().to_be_bytes());
        entry[9..].copy_from_slice(&self.hash);
        Ok(entry)
    }
}

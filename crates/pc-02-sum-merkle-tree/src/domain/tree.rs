//! # Sum Merkle Tree
//!
//! ALGORITHM: binary hash tree over `(hash, length)` leaves. Leaves are padded
//! to the next power of two with `SumMerkleTreeNode::empty()`, then layers are
//! built bottom-up until one node remains.
//!
//! A leaf's window in the coin space is the prefix sum of the lengths before
//! it, so `[offset, offset + length)`.

use shared_types::{Hash, Segment, U256};
use tracing::trace;

use super::errors::TreeError;
use super::node::{SumMerkleTreeNode, PROOF_ENTRY_LEN};
use super::proof::SumMerkleProof;

/// Maximum tree depth (`2^20` leaves).
pub const MAX_DEPTH: u32 = 20;

/// Depth needed for `leaf_count` leaves.
pub fn depth_for(leaf_count: usize) -> u32 {
    leaf_count.next_power_of_two().trailing_zeros()
}

/// Sum Merkle tree, stored layer by layer (leaves first, root last).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SumMerkleTree {
    layers: Vec<Vec<SumMerkleTreeNode>>,
}

impl SumMerkleTree {
    /// Build a tree from at least one leaf.
    pub fn new(leaves: Vec<SumMerkleTreeNode>) -> Result<Self, TreeError> {
        if leaves.is_empty() {
            return Err(TreeError::EmptyLeaves);
        }
        let depth = depth_for(leaves.len());
        if depth > MAX_DEPTH {
            return Err(TreeError::TreeTooDeep {
                depth,
                max: MAX_DEPTH,
            });
        }

        let mut layer = leaves;
        layer.resize(1usize << depth, SumMerkleTreeNode::empty());

        let mut layers = Vec::with_capacity(depth as usize + 1);
        while layer.len() > 1 {
            let next: Vec<SumMerkleTreeNode> = layer
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => SumMerkleTreeNode::parent(left, right),
                    [single] => *single,
                    _ => SumMerkleTreeNode::empty(),
                })
                .collect();
            layers.push(layer);
            layer = next;
        }
        layers.push(layer);

        trace!(
            "[pc-02] built sum merkle tree: depth={}, leaves={}",
            depth,
            layers[0].len()
        );
        Ok(Self { layers })
    }

    /// Root hash.
    pub fn root(&self) -> Result<Hash, TreeError> {
        self.root_node().map(|node| node.hash)
    }

    /// Root node (hash and total length).
    pub fn root_node(&self) -> Result<SumMerkleTreeNode, TreeError> {
        match self.layers.last().map(Vec::as_slice) {
            Some([root]) => Ok(*root),
            Some(top) => Err(TreeError::InvalidRoot { nodes: top.len() }),
            None => Err(TreeError::InvalidRoot { nodes: 0 }),
        }
    }

    /// Sum of all leaf lengths.
    pub fn total_amount(&self) -> U256 {
        self.leaves()
            .iter()
            .fold(U256::zero(), |acc, leaf| acc + leaf.length)
    }

    /// Padded leaf layer.
    pub fn leaves(&self) -> &[SumMerkleTreeNode] {
        self.layers.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tree depth (number of proof entries per leaf).
    pub fn depth(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// Raw proof bytes for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<Vec<u8>, TreeError> {
        let leaf_count = self.leaves().len();
        if index >= leaf_count {
            return Err(TreeError::InvalidLeafIndex {
                index,
                leaves: leaf_count,
            });
        }

        let mut proof = Vec::with_capacity(self.depth() * PROOF_ENTRY_LEN);
        let mut position = index;
        for layer in &self.layers[..self.depth()] {
            let (sibling, side) = if position % 2 == 0 {
                (position + 1, 0u8)
            } else {
                (position - 1, 1u8)
            };
            let node = layer.get(sibling).ok_or(TreeError::InvalidLeafIndex {
                index: sibling,
                leaves: layer.len(),
            })?;
            proof.extend_from_slice(&node.to_proof_entry(side)?);
            position /= 2;
        }
        Ok(proof)
    }

    /// Proofs for every non-empty leaf whose hash equals `leaf`.
    pub fn proofs(&self, num_tokens: u64, leaf: &Hash) -> Result<Vec<SumMerkleProof>, TreeError> {
        self.collect_proofs(num_tokens, |node, _| node.hash == *leaf)
    }

    /// Proofs for every non-empty leaf whose window intersects `[start, end)`.
    pub fn get_proof_by_range(
        &self,
        num_tokens: u64,
        start: U256,
        end: U256,
    ) -> Result<Vec<SumMerkleProof>, TreeError> {
        self.collect_proofs(num_tokens, |_, window| {
            window.start() < end && start < window.end()
        })
    }

    fn collect_proofs<F>(&self, num_tokens: u64, mut select: F) -> Result<Vec<SumMerkleProof>, TreeError>
    where
        F: FnMut(&SumMerkleTreeNode, &Segment) -> bool,
    {
        let mut proofs = Vec::new();
        let mut offset = U256::zero();
        for (index, node) in self.leaves().iter().enumerate() {
            let next = offset + node.length;
            // Zero-length leaves are padding and have no window.
            if let Ok(window) = Segment::new(offset, next) {
                if select(node, &window) {
                    proofs.push(SumMerkleProof {
                        num_tokens,
                        index,
                        segment: window,
                        leaf: node.hash,
                        proof: self.proof(index)?,
                    });
                }
            }
            offset = next;
        }
        Ok(proofs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::proof::verify;

    fn leaf(suffix: u8, length: u64) -> SumMerkleTreeNode {
        let mut hash = [0u8; 32];
        hex::decode_to_slice(
            "f19587814e8e932897572358b3c0ca6d9cbcc71654b1d312195607aa2b000000",
            &mut hash,
        )
        .unwrap();
        hash[31] = suffix;
        SumMerkleTreeNode::new(hash, U256::from(length))
    }

    fn reference_tree() -> SumMerkleTree {
        SumMerkleTree::new(vec![leaf(1, 2), leaf(2, 3), leaf(3, 4), leaf(4, 5)]).unwrap()
    }

    #[test]
    fn test_empty_leaves_rejected() {
        assert_eq!(SumMerkleTree::new(vec![]), Err(TreeError::EmptyLeaves));
    }

    #[test]
    fn test_depth_limit() {
        assert_eq!(depth_for(1), 0);
        assert_eq!(depth_for(3), 2);
        assert_eq!(depth_for(1 << 20), 20);
        assert_eq!(depth_for((1 << 20) + 1), 21);
    }

    #[test]
    fn test_single_leaf_is_root() {
        let tree = SumMerkleTree::new(vec![leaf(9, 7)]).unwrap();
        assert_eq!(tree.root().unwrap(), leaf(9, 7).hash);
        assert!(tree.proof(0).unwrap().is_empty());
    }

    #[test]
    fn test_padding_3_to_4() {
        let tree = SumMerkleTree::new(vec![leaf(1, 1), leaf(2, 1), leaf(3, 1)]).unwrap();
        assert_eq!(tree.leaves().len(), 4);
        assert_eq!(tree.leaves()[3], SumMerkleTreeNode::empty());
        assert_eq!(tree.total_amount(), U256::from(3));
    }

    #[test]
    fn test_reference_root() {
        let tree = reference_tree();
        assert_eq!(
            hex::encode(tree.root().unwrap()),
            "ebb8ba315482e3536c34265ee2c1bf02c13a9fd4ceb10807b6d2ffbcd02d8ee5"
        );
        assert_eq!(tree.root_node().unwrap().length, U256::from(14));
    }

    #[test]
    fn test_reference_leaf_verifies() {
        let tree = reference_tree();
        let root = tree.root().unwrap();
        let proof = tree.proof(2).unwrap();
        assert_eq!(proof.len(), 2 * PROOF_ENTRY_LEN);
        assert_eq!(proof[0], 0);
        assert_eq!(proof[PROOF_ENTRY_LEN], 1);

        let total = U256::from(14);
        assert!(verify(U256::from(5), U256::from(9), &leaf(3, 4).hash, total, &root, &proof));
        assert!(!verify(U256::from(4), U256::from(8), &leaf(3, 4).hash, total, &root, &proof));
        assert!(!verify(U256::from(5), U256::from(9), &leaf(4, 4).hash, total, &root, &proof));
    }

    #[test]
    fn test_any_flipped_byte_fails() {
        let tree = reference_tree();
        let root = tree.root().unwrap();
        let proof = tree.proof(2).unwrap();
        for i in 0..proof.len() {
            let mut tampered = proof.clone();
            tampered[i] ^= 0x01;
            assert!(
                !verify(U256::from(5), U256::from(9), &leaf(3, 4).hash, U256::from(14), &root, &tampered),
                "byte {} flipped still verified",
                i
            );
        }
    }

    #[test]
    fn test_invalid_leaf_index() {
        let tree = reference_tree();
        assert_eq!(
            tree.proof(4),
            Err(TreeError::InvalidLeafIndex { index: 4, leaves: 4 })
        );
    }

    #[test]
    fn test_proofs_by_hash_and_range() {
        let tree = SumMerkleTree::new(vec![leaf(1, 10), leaf(2, 5), leaf(1, 20)]).unwrap();

        let by_hash = tree.proofs(1, &leaf(1, 0).hash).unwrap();
        assert_eq!(by_hash.len(), 2);
        assert_eq!(by_hash[0].segment, Segment::from_u64(0, 10).unwrap());
        assert_eq!(by_hash[1].segment, Segment::from_u64(15, 35).unwrap());

        let by_range = tree
            .get_proof_by_range(1, U256::from(9), U256::from(16))
            .unwrap();
        let indexes: Vec<_> = by_range.iter().map(|p| p.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);

        let root = tree.root().unwrap();
        for proof in by_range {
            assert!(proof.verify(&root, U256::from(35)));
        }
    }

    #[test]
    fn test_range_skips_padding() {
        let tree = SumMerkleTree::new(vec![leaf(1, 10), leaf(2, 5), leaf(3, 1)]).unwrap();
        let all = tree
            .get_proof_by_range(1, U256::zero(), U256::from(1000))
            .unwrap();
        assert_eq!(all.len(), 3);
    }
}

//! # Domain Errors
//!
//! Error types for tree construction and proof generation. Verification
//! itself never errors; it returns `false`.

use thiserror::Error;

/// Sum Merkle tree errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A tree needs at least one leaf.
    #[error("Sum Merkle tree requires at least one leaf")]
    EmptyLeaves,

    /// Padded leaf count would exceed `2^max`.
    #[error("Tree depth {depth} exceeds maximum {max}")]
    TreeTooDeep {
        /// Required depth
        depth: u32,
        /// Allowed depth
        max: u32,
    },

    /// Top layer did not collapse to a single node.
    #[error("Invalid root: top layer has {nodes} nodes")]
    InvalidRoot {
        /// Node count in the top layer
        nodes: usize,
    },

    /// Leaf index out of bounds.
    #[error("Invalid leaf index {index} (leaves: {leaves})")]
    InvalidLeafIndex {
        /// Requested index
        index: usize,
        /// Padded leaf count
        leaves: usize,
    },

    /// A node length does not fit the 8-byte proof field.
    #[error("Node length exceeds 64 bits")]
    LengthOverflow,
}

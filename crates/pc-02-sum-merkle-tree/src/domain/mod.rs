//! # Domain Layer - Sum Merkle Tree
//!
//! - `node`: SumMerkleTreeNode and its proof entry encoding
//! - `tree`: SumMerkleTree construction and proof generation
//! - `proof`: SumMerkleProof and stateless verification
//! - `errors`: TreeError enumeration

pub mod errors;
pub mod node;
pub mod proof;
pub mod tree;

pub use errors::*;
pub use node::*;
pub use proof::*;
pub use tree::*;

//! # Sum Merkle Tree Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Commits a block's coin-space partition to a single root. Every node carries
//! the sum of the lengths below it, so a proof for one leaf also proves the
//! exact window `[left, right)` that leaf occupies in the coin space.
//!
//! ## Node Hash
//!
//! ```text
//! parent.hash   = keccak256(be32(left.len) || left.hash || be32(right.len) || right.hash)
//! parent.length = left.len + right.len
//! ```
//!
//! ## Proof Layout
//!
//! One 41-byte entry per level, leaf to root:
//!
//! ```text
//! side (1) || sibling length (8, big-endian) || sibling hash (32)
//! side 0 = sibling on the right, side 1 = sibling on the left
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Leaves padded to a power of two | `domain/tree.rs` - `SumMerkleTree::new` |
//! | Depth at most 20 | `domain/tree.rs` - `SumMerkleTree::new` |
//! | Verification never panics | `domain/proof.rs` - `verify` |

#![warn(missing_docs)]

pub mod domain;

pub use domain::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

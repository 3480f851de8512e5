//! # Block Subsystem
//!
//! **Subsystem ID:** 4
//!
//! ## Purpose
//!
//! A block batches admitted transactions (or marks one deposit), commits the
//! resulting coin-space partition to a sum Merkle tree and hands out
//! inclusion and exclusion proofs against that root.
//!
//! ## Leaf Layout
//!
//! ```text
//! [ gap ][ tx A out 0 ][ tx B out 0 ][ gap ][ tx A out 1 ] ... [ gap up to num_tokens * 2^48 ]
//! ```
//!
//! Transaction outputs are keyed by the transaction hash, a deposit by its
//! state update hash, and gaps by the zero hash.
//!
//! ## Lifecycle
//!
//! ```text
//! [OPEN] --get_root()--> [FROZEN] --set_super_root/timestamp/number--> [SUBMITTED]
//! ```
//!
//! `append_tx` and `set_deposit_tx` fail with `BlockFrozen` once the tree exists.

#![warn(missing_docs)]

pub mod domain;

pub use domain::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}

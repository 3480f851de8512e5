//! # Domain Layer - Block
//!
//! - `block`: Block and its sum Merkle commitment
//! - `proofs`: inclusion, deposit and exclusion proof bundles
//! - `errors`: BlockError enumeration

pub mod block;
pub mod errors;
pub mod proofs;

pub use block::*;
pub use errors::*;
pub use proofs::*;

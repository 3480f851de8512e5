//! # State Manager Subsystem
//!
//! **Subsystem ID:** 3
//!
//! ## Purpose
//!
//! Tracks which state update currently governs each part of the coin space.
//! Transactions are checked against it (`is_contain`), consume from it
//! (`spend`) and install their outputs into it (`insert`).
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Tracked entries never overlap | `insert`, `insert_deposit_tx`, `deserialize` |
//! | `spend` is all-or-nothing | `StateManager::spend` |
//! | Exiting ranges never satisfy `is_contain` | `StateManager::is_contain` |
//! | Snapshots are deterministic | `serialize` iterates by segment start |

#![warn(missing_docs)]

pub mod domain;

pub use domain::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

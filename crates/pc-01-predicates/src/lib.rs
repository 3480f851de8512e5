//! # Predicates Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Defines what a claim on a segment looks like (`StateUpdate`), how claims are
//! batched into transfers (`Transaction`, `SignedTransaction`) and who may
//! deprecate a claim (`Predicate` strategies held by `PredicatesManager`).
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Derived state updates are new values | `domain/state_update.rs` |
//! | Transactions have at least one output | `Transaction::new` |
//! | Unregistered predicates never verify | `PredicatesManager::verify_deprecation` |
//!
//! ## Module Structure
//!
//! ```text
//! domain/state_update.rs  - StateUpdate, canonical + storage encodings
//! domain/transaction.rs   - Transaction, SignedTransaction
//! domain/errors.rs        - PredicateError
//! predicates/             - Predicate trait, Ownership, PaymentChannel
//! manager.rs              - PredicatesManager registry
//! ```

#![warn(missing_docs)]

pub mod domain;
pub mod manager;
pub mod predicates;

pub use domain::*;
pub use manager::PredicatesManager;
pub use predicates::{OwnershipPredicate, PaymentChannelPredicate, Predicate};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

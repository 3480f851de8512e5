//! # Domain Layer - Predicates Subsystem
//!
//! - `state_update`: StateUpdate value type and its encodings
//! - `transaction`: Transaction and SignedTransaction
//! - `errors`: PredicateError enumeration

pub mod errors;
pub mod state_update;
pub mod transaction;

pub use errors::*;
pub use state_update::*;
pub use transaction::*;

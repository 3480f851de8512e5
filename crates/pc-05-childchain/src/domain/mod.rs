//! # Domain Layer - Child Chain
//!
//! - `errors`: ChainError enumeration
//! - `tx_filter`: input admission control for the in-flight block
//! - `events`: typed root chain events
//! - `history`: segment history replay and verification

pub mod errors;
pub mod events;
pub mod history;
pub mod tx_filter;

pub use errors::*;
pub use events::*;
pub use history::*;
pub use tx_filter::*;

//! Predicate error types.

use shared_crypto::CryptoError;
use shared_types::{Address, DecodeError, Segment};
use thiserror::Error;

/// Errors raised by state updates, transactions and the predicate registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// No predicate is registered at this address, or under this name.
    #[error("Unknown predicate: {0}")]
    UnknownPredicate(String),

    /// A sub-range was requested outside the update's segment.
    #[error("Segment {requested} is not contained in {current}")]
    SegmentNotContained {
        /// Segment held by the state update
        current: Segment,
        /// Segment that was asked for
        requested: Segment,
    },

    /// A transaction must carry at least one output.
    #[error("Transaction has no outputs")]
    EmptyTransaction,

    /// Byte decoding failed.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Signing failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl PredicateError {
    /// Convenience constructor for an unregistered predicate address.
    pub fn unknown_address(address: &Address) -> Self {
        PredicateError::UnknownPredicate(shared_types::address_to_hex(address))
    }
}

//! Child chain error types.

use pc_01_predicates::PredicateError;
use pc_02_sum_merkle_tree::TreeError;
use pc_03_state_manager::StateManagerError;
use pc_04_block::BlockError;
use shared_types::{Segment, SegmentError};
use thiserror::Error;

/// Child chain errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Inputs are not spendable with the attached witnesses.
    #[error("Invalid transaction")]
    InvalidTransaction,

    /// An input overlaps one already queued for the in-flight block.
    #[error("Input {0} overlaps a queued transaction")]
    OverlappedInputs(Segment),

    /// A new entry overlaps tracked state.
    #[error("Segment {0} is already claimed")]
    SegmentAlreadyClaimed(Segment),

    /// No tracked entry contains the segment.
    #[error("Segment {0} is not tracked")]
    SegmentNotTracked(Segment),

    /// Segment construction failed.
    #[error("Invalid segment: {0}")]
    InvalidSegment(String),

    /// Every queued transaction was rejected during block generation.
    #[error("No valid transactions")]
    NoValidTransactions,

    /// Requested block is not in the store.
    #[error("Block {0} not found")]
    BlockNotFound(u64),

    /// A deposit names a token outside the listed coin space.
    #[error("Token {0} is not listed")]
    TokenNotListed(u64),

    /// Predicate address or name is not registered.
    #[error("Unknown predicate: {0}")]
    UnknownPredicate(String),

    /// Too many leaves for one block.
    #[error("Tree too deep: depth {depth} exceeds {max}")]
    TreeTooDeep {
        /// Required depth
        depth: u32,
        /// Supported maximum
        max: u32,
    },

    /// The tree did not reduce to a single root.
    #[error("Invalid root")]
    InvalidRoot,

    /// A segment history does not replay against its block roots.
    #[error("Invalid history: {0}")]
    InvalidHistory(String),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(String),

    /// Backing store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encoding or decoding of persisted data failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Anything else.
    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl ChainError {
    /// True for rejections that replaying the same input can never fix.
    ///
    /// Storage, encoding and tree faults are not permanent.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ChainError::InvalidTransaction
                | ChainError::OverlappedInputs(_)
                | ChainError::SegmentAlreadyClaimed(_)
                | ChainError::SegmentNotTracked(_)
                | ChainError::InvalidSegment(_)
                | ChainError::NoValidTransactions
                | ChainError::BlockNotFound(_)
                | ChainError::TokenNotListed(_)
                | ChainError::UnknownPredicate(_)
                | ChainError::InvalidHistory(_)
        )
    }
}

impl From<SegmentError> for ChainError {
    fn from(e: SegmentError) -> Self {
        ChainError::InvalidSegment(e.to_string())
    }
}

impl From<PredicateError> for ChainError {
    fn from(e: PredicateError) -> Self {
        match e {
            PredicateError::UnknownPredicate(name) => ChainError::UnknownPredicate(name),
            PredicateError::Decode(e) => ChainError::Serialization(e.to_string()),
            other => ChainError::UnknownError(other.to_string()),
        }
    }
}

impl From<TreeError> for ChainError {
    fn from(e: TreeError) -> Self {
        match e {
            TreeError::TreeTooDeep { depth, max } => ChainError::TreeTooDeep { depth, max },
            TreeError::InvalidRoot { .. } => ChainError::InvalidRoot,
            other => ChainError::UnknownError(other.to_string()),
        }
    }
}

impl From<StateManagerError> for ChainError {
    fn from(e: StateManagerError) -> Self {
        match e {
            StateManagerError::SegmentAlreadyClaimed(segment) => {
                ChainError::SegmentAlreadyClaimed(segment)
            }
            StateManagerError::SegmentNotTracked(segment) => ChainError::SegmentNotTracked(segment),
            StateManagerError::Serialization(msg) | StateManagerError::CorruptSnapshot(msg) => {
                ChainError::Serialization(msg)
            }
        }
    }
}

impl From<BlockError> for ChainError {
    fn from(e: BlockError) -> Self {
        match e {
            BlockError::Tree(tree) => tree.into(),
            BlockError::Serialization(msg) => ChainError::Serialization(msg),
            other => ChainError::UnknownError(other.to_string()),
        }
    }
}

//! Block error types.

use pc_02_sum_merkle_tree::TreeError;
use shared_types::{Hash, Segment, U256};
use thiserror::Error;

/// Block errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    /// The root was already computed; contents are immutable.
    #[error("Block is frozen")]
    BlockFrozen,

    /// Two committed items overlap.
    #[error("Overlapping outputs at {0}")]
    OverlappingOutputs(Segment),

    /// A committed item lies outside the listed token space.
    #[error("Segment {0} is outside the coin space")]
    SegmentOutOfRange(Segment),

    /// Offset lies outside the listed token space.
    #[error("Offset {0} is outside the coin space")]
    OffsetOutOfRange(U256),

    /// An exclusion proof was requested for an included offset.
    #[error("Offset {0} is included in the block")]
    OffsetIncluded(U256),

    /// No transaction with this hash is in the block.
    #[error("Transaction 0x{} not found in block", hex::encode(.0))]
    TransactionNotFound(Hash),

    /// Tree construction or proof generation failed.
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    /// Block encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

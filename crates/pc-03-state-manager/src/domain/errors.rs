//! State manager error types.

use shared_types::Segment;
use thiserror::Error;

/// State manager errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateManagerError {
    /// The segment overlaps a tracked entry.
    #[error("Segment {0} overlaps an already claimed range")]
    SegmentAlreadyClaimed(Segment),

    /// No single tracked entry contains the segment.
    #[error("Segment {0} is not tracked")]
    SegmentNotTracked(Segment),

    /// Snapshot encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Snapshot bytes could not be decoded or violate the non-overlap invariant.
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

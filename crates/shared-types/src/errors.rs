//! # Error Types
//!
//! Errors shared by the value types in this crate.

use crate::U256;
use thiserror::Error;

/// Errors raised while constructing or decoding a `Segment`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// `start` must be strictly less than `end`.
    #[error("Invalid segment: start {start} must be less than end {end}")]
    InvalidRange { start: U256, end: U256 },

    /// Token-local offsets must stay inside one token window.
    #[error("Offset {offset} exceeds the token window")]
    OutOfTokenWindow { offset: U256 },

    /// Token id is above the supported maximum.
    #[error("Token id {token_id} exceeds maximum {max}")]
    TokenIdTooLarge { token_id: u64, max: u64 },
}

/// Errors raised by the byte-level decoders in `codec`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before the expected field.
    #[error("Unexpected end of input: needed {needed} bytes at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },

    /// Bytes remained after the last field.
    #[error("Trailing bytes: {remaining} left after decoding")]
    TrailingBytes { remaining: usize },

    /// A decoded field violated its invariant.
    #[error("Invalid field: {0}")]
    InvalidField(String),
}

impl From<SegmentError> for DecodeError {
    fn from(err: SegmentError) -> Self {
        DecodeError::InvalidField(err.to_string())
    }
}

//! # Segment
//!
//! A half-open range `[start, end)` of the global coin space.
//!
//! Segments are immutable values. Every arithmetic operation returns new
//! segments; none of them mutate `self`.

use crate::entities::{TOKEN_SEGMENT_BITS, TOKEN_SEGMENT_SIZE, MAX_TOKENS, U256};
use crate::errors::SegmentError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw serialized form. Deserialization re-validates `start < end`.
#[derive(Serialize, Deserialize)]
struct RawSegment {
    start: U256,
    end: U256,
}

/// Half-open range `[start, end)` with `start < end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSegment", into = "RawSegment")]
pub struct Segment {
    start: U256,
    end: U256,
}

impl TryFrom<RawSegment> for Segment {
    type Error = SegmentError;

    fn try_from(raw: RawSegment) -> Result<Self, Self::Error> {
        Segment::new(raw.start, raw.end)
    }
}

impl From<Segment> for RawSegment {
    fn from(segment: Segment) -> Self {
        RawSegment {
            start: segment.start,
            end: segment.end,
        }
    }
}

impl Segment {
    /// Create a segment, failing unless `start < end`.
    pub fn new(start: U256, end: U256) -> Result<Self, SegmentError> {
        if start >= end {
            return Err(SegmentError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Convenience constructor for small ranges.
    pub fn from_u64(start: u64, end: u64) -> Result<Self, SegmentError> {
        Self::new(U256::from(start), U256::from(end))
    }

    /// Map a token-local range `[start, end)` into the global coin space.
    pub fn from_token(token_id: u64, start: U256, end: U256) -> Result<Self, SegmentError> {
        if token_id > MAX_TOKENS {
            return Err(SegmentError::TokenIdTooLarge {
                token_id,
                max: MAX_TOKENS,
            });
        }
        let window = U256::from(TOKEN_SEGMENT_SIZE);
        if end > window {
            return Err(SegmentError::OutOfTokenWindow { offset: end });
        }
        let base = U256::from(token_id) << TOKEN_SEGMENT_BITS;
        Self::new(base + start, base + end)
    }

    /// Start of the range (inclusive).
    pub fn start(&self) -> U256 {
        self.start
    }

    /// End of the range (exclusive).
    pub fn end(&self) -> U256 {
        self.end
    }

    /// Number of coins covered.
    pub fn width(&self) -> U256 {
        self.end - self.start
    }

    /// Token whose window holds `start`.
    pub fn token_id(&self) -> u64 {
        (self.start >> TOKEN_SEGMENT_BITS).low_u64()
    }

    /// `start` relative to the token window.
    pub fn local_start(&self) -> U256 {
        self.start - (U256::from(self.token_id()) << TOKEN_SEGMENT_BITS)
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Segment) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if `offset` lies inside `[start, end)`.
    pub fn contains_offset(&self, offset: U256) -> bool {
        self.start <= offset && offset < self.end
    }

    /// True if the two ranges share at least one coin.
    pub fn overlaps(&self, other: &Segment) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Common range of `self` and `other`, if any.
    pub fn intersect(&self, other: &Segment) -> Option<Segment> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(Segment { start, end })
        } else {
            None
        }
    }

    /// Parts of `self` not covered by `other`, in ascending order.
    ///
    /// Returns `[self]` when the two do not overlap and an empty vector when
    /// `other` covers `self` entirely.
    pub fn subtract(&self, other: &Segment) -> Vec<Segment> {
        if !self.overlaps(other) {
            return vec![*self];
        }
        let mut parts = Vec::with_capacity(2);
        if self.start < other.start {
            parts.push(Segment {
                start: self.start,
                end: other.start,
            });
        }
        if other.end < self.end {
            parts.push(Segment {
                start: other.end,
                end: self.end,
            });
        }
        parts
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

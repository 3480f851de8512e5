//! # Transaction Filter
//!
//! Tracks input segments claimed by transactions queued for the in-flight
//! block. Entries are keyed by start offset and never overlap, so an overlap
//! check only needs the nearest entry on each side.

use std::collections::BTreeMap;
use std::ops::Bound;

use pc_01_predicates::SignedTransaction;
use shared_types::{Segment, U256};
use tracing::debug;

use super::errors::ChainError;

/// Input segments claimed in the current block.
#[derive(Clone, Debug, Default)]
pub struct TxFilter {
    segments: BTreeMap<U256, Segment>,
}

impl TxFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if `segment` overlaps a recorded one.
    pub fn overlaps(&self, segment: &Segment) -> bool {
        let before = self
            .segments
            .range(..=segment.start())
            .next_back()
            .map(|(_, s)| s);
        let after = self
            .segments
            .range((Bound::Excluded(segment.start()), Bound::Unbounded))
            .next()
            .map(|(_, s)| s);
        before.into_iter().chain(after).any(|s| s.overlaps(segment))
    }

    /// Record every input of `tx`, or none of them.
    pub fn check_and_insert_tx(&mut self, tx: &SignedTransaction) -> Result<(), ChainError> {
        let mut inputs: Vec<Segment> = tx.tx().input_segments().collect();
        inputs.sort();
        for pair in inputs.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(ChainError::OverlappedInputs(pair[1]));
            }
        }
        if let Some(segment) = inputs.iter().find(|s| self.overlaps(s)) {
            debug!("[pc-05] input {} already queued", segment);
            return Err(ChainError::OverlappedInputs(*segment));
        }
        for segment in inputs {
            self.segments.insert(segment.start(), segment);
        }
        Ok(())
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

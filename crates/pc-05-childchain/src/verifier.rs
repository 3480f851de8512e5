//! # History Verifier
//!
//! Rebuilds the state of one segment from the first block on, checking every
//! block's proofs against the root recorded in its header. Cached proofs that
//! fail the root check are refetched up to `max_retries` times before the
//! history is declared invalid.

use std::sync::Arc;

use pc_01_predicates::PredicatesManager;
use pc_03_state_manager::StateManager;
use shared_types::{Hash, Segment};
use tracing::{debug, info, warn};

use crate::domain::{apply_segmented_block, BlockHeader, ChainError, HistoryFault, SegmentedBlock};
use crate::ports::HistorySource;

/// Headers requested per round trip.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Verifies a segment's history.
pub struct HistoryVerifier {
    predicates: Arc<PredicatesManager>,
    source: Arc<dyn HistorySource>,
    max_retries: u32,
    page_size: u64,
}

impl HistoryVerifier {
    /// Create a verifier. `max_retries` refetches are allowed per block.
    pub fn new(
        predicates: Arc<PredicatesManager>,
        source: Arc<dyn HistorySource>,
        max_retries: u32,
    ) -> Self {
        Self {
            predicates,
            source,
            max_retries,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the header page size.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Replay blocks `[from, to]` for `segment`, using `key` to address the
    /// proof cache. Returns the resulting state.
    pub async fn verify(
        &self,
        key: &str,
        segment: &Segment,
        from: u64,
        to: u64,
    ) -> Result<StateManager, ChainError> {
        let mut state = StateManager::new(self.predicates.clone());
        let mut cursor = from;
        while cursor <= to {
            let page_end = cursor.saturating_add(self.page_size - 1).min(to);
            for header in self.source.block_headers(cursor, page_end).await? {
                match header {
                    BlockHeader::Deposit { blk_num, deposit } => {
                        if deposit.segment.overlaps(segment) && !state.contains_update(&deposit) {
                            debug!("[pc-05] history: deposit {} in block {}", deposit.segment, blk_num);
                            state
                                .insert_deposit_tx(deposit)
                                .map_err(|e| ChainError::InvalidHistory(e.to_string()))?;
                        }
                    }
                    BlockHeader::Submitted { blk_num, root } => {
                        self.verify_block(&mut state, key, segment, blk_num, &root)
                            .await?;
                    }
                }
            }
            if page_end == u64::MAX {
                break;
            }
            cursor = page_end + 1;
        }
        info!(
            "[pc-05] history of {} verified through block {}: entries={}",
            segment,
            to,
            state.len()
        );
        Ok(state)
    }

    async fn verify_block(
        &self,
        state: &mut StateManager,
        key: &str,
        segment: &Segment,
        blk_num: u64,
        root: &Hash,
    ) -> Result<(), ChainError> {
        let mut block = match self.source.cached_segmented_block(key, blk_num).await? {
            Some(block) => Some(block),
            None => self.fetch(key, blk_num, segment).await?,
        };
        let mut retries_left = self.max_retries;
        loop {
            let fault = match &block {
                Some(block) => match apply_segmented_block(state, root, block) {
                    Ok(()) => return Ok(()),
                    Err(fault) => fault,
                },
                None => HistoryFault::Stale(format!("no proofs for block {blk_num}")),
            };

            match fault {
                HistoryFault::Invalid(reason) => {
                    return Err(ChainError::InvalidHistory(reason));
                }
                HistoryFault::Stale(reason) if retries_left == 0 => {
                    return Err(ChainError::InvalidHistory(format!(
                        "block {blk_num}: {reason}"
                    )));
                }
                HistoryFault::Stale(reason) => {
                    retries_left -= 1;
                    warn!(
                        "[pc-05] history: refetching block {} ({}), retries left={}",
                        blk_num, reason, retries_left
                    );
                    block = self.fetch(key, blk_num, segment).await?;
                }
            }
        }
    }

    async fn fetch(
        &self,
        key: &str,
        blk_num: u64,
        segment: &Segment,
    ) -> Result<Option<SegmentedBlock>, ChainError> {
        let block = self.source.fetch_segmented_block(blk_num, segment).await?;
        if let Some(fresh) = &block {
            self.source.store_segmented_block(key, fresh.clone()).await?;
        }
        Ok(block)
    }
}

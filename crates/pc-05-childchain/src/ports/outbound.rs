//! # Outbound Ports
//!
//! Dependencies the child chain needs from its environment: a key-value store,
//! a root chain log source, watcher bookkeeping and a block history source.

use async_trait::async_trait;
use shared_types::{Hash, Segment};

use crate::domain::{BlockHeader, ChainError, EventLog, SegmentedBlock};

/// Abstract interface for the persistent key-value store.
///
/// Keys used by the chain: `waitingblock.0x<root>`, `block.<n>`, `snapshot`,
/// `numTokens`.
#[async_trait]
pub trait ChainDb: Send + Sync {
    /// True if `key` is present.
    async fn contains(&self, key: &str) -> Result<bool, ChainError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn insert(&self, key: &str, value: Vec<u8>) -> Result<(), ChainError>;

    /// Value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ChainError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), ChainError>;
}

/// Root chain log source.
#[async_trait]
pub trait EthEventAdaptor: Send + Sync {
    /// Latest root chain block number.
    async fn latest_block_number(&self) -> Result<u64, ChainError>;

    /// Logs in `[from, to]` with at least `confirmation` blocks on top.
    async fn get_logs(&self, from: u64, to: u64, confirmation: u64)
        -> Result<Vec<EventLog>, ChainError>;
}

/// Watcher bookkeeping: the loaded cursor and the seen transaction hashes.
#[async_trait]
pub trait EventWatcherStorage: Send + Sync {
    /// Last loaded root chain block, or `initial` if nothing was loaded yet.
    async fn get_loaded(&self, initial: u64) -> Result<u64, ChainError>;

    /// Advance the cursor.
    async fn set_loaded(&self, loaded: u64) -> Result<(), ChainError>;

    /// True if logs of `tx_hash` were already applied.
    async fn get_seen(&self, tx_hash: &Hash) -> Result<bool, ChainError>;

    /// Mark logs of `tx_hash` as applied.
    async fn add_seen(&self, tx_hash: &Hash) -> Result<(), ChainError>;
}

/// Source of block headers and per-segment block proofs for history replay.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Headers for blocks in `[from, to]`. Missing blocks are skipped.
    async fn block_headers(&self, from: u64, to: u64) -> Result<Vec<BlockHeader>, ChainError>;

    /// Cached proofs for `blk_num` under `key`.
    async fn cached_segmented_block(
        &self,
        key: &str,
        blk_num: u64,
    ) -> Result<Option<SegmentedBlock>, ChainError>;

    /// Fresh proofs for `segment` in `blk_num` from the operator.
    async fn fetch_segmented_block(
        &self,
        blk_num: u64,
        segment: &Segment,
    ) -> Result<Option<SegmentedBlock>, ChainError>;

    /// Replace the cached proofs for `block.blk_num` under `key`.
    async fn store_segmented_block(&self, key: &str, block: SegmentedBlock)
        -> Result<(), ChainError>;
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Segment;

use crate::domain::{BlockHeader, ChainError, SegmentedBlock};
use crate::ports::HistorySource;
use crate::service::Chain;

/// History source reading blocks straight from a `Chain`, with an in-memory
/// proof cache keyed by `(key, blk_num)`.
pub struct ChainHistorySource {
    chain: Arc<Chain>,
    cache: RwLock<HashMap<(String, u64), SegmentedBlock>>,
}

impl ChainHistorySource {
    pub fn new(chain: Arc<Chain>) -> Self {
        Self {
            chain,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl HistorySource for ChainHistorySource {
    async fn block_headers(&self, from: u64, to: u64) -> Result<Vec<BlockHeader>, ChainError> {
        let mut headers = Vec::new();
        for blk_num in from..=to {
            let mut block = match self.chain.get_block(blk_num).await {
                Ok(block) => block,
                Err(ChainError::BlockNotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            let header = match block.deposit_tx() {
                Some(deposit) => BlockHeader::Deposit {
                    blk_num,
                    deposit: deposit.clone(),
                },
                None => BlockHeader::Submitted {
                    blk_num,
                    root: block.get_root()?,
                },
            };
            headers.push(header);
        }
        Ok(headers)
    }

    async fn cached_segmented_block(
        &self,
        key: &str,
        blk_num: u64,
    ) -> Result<Option<SegmentedBlock>, ChainError> {
        Ok(self.cache.read().get(&(key.to_string(), blk_num)).cloned())
    }

    async fn fetch_segmented_block(
        &self,
        blk_num: u64,
        segment: &Segment,
    ) -> Result<Option<SegmentedBlock>, ChainError> {
        let mut block = match self.chain.get_block(blk_num).await {
            Ok(block) => block,
            Err(ChainError::BlockNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let items = block.get_segment_proofs(segment)?;
        Ok(Some(SegmentedBlock { blk_num, items }))
    }

    async fn store_segmented_block(
        &self,
        key: &str,
        block: SegmentedBlock,
    ) -> Result<(), ChainError> {
        self.cache
            .write()
            .insert((key.to_string(), block.blk_num), block);
        Ok(())
    }
}

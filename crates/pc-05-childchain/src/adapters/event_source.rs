use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{ChainError, EventLog};
use crate::ports::EthEventAdaptor;

/// In-memory root chain log source for testing.
///
/// Logs are pushed by the test; the latest block number follows the highest
/// pushed log unless set explicitly.
#[derive(Default)]
pub struct InMemoryEventSource {
    logs: RwLock<Vec<EventLog>>,
    latest: RwLock<u64>,
}

impl InMemoryEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a log.
    pub fn push_log(&self, log: EventLog) {
        let mut latest = self.latest.write();
        *latest = (*latest).max(log.block_number);
        self.logs.write().push(log);
    }

    /// Override the latest block number.
    pub fn set_latest(&self, block_number: u64) {
        *self.latest.write() = block_number;
    }
}

#[async_trait]
impl EthEventAdaptor for InMemoryEventSource {
    async fn latest_block_number(&self) -> Result<u64, ChainError> {
        Ok(*self.latest.read())
    }

    async fn get_logs(
        &self,
        from: u64,
        to: u64,
        confirmation: u64,
    ) -> Result<Vec<EventLog>, ChainError> {
        let Some(confirmed_to) = to.checked_sub(confirmation) else {
            return Ok(Vec::new());
        };
        let mut logs: Vec<EventLog> = self
            .logs
            .read()
            .iter()
            .filter(|log| log.block_number >= from && log.block_number <= confirmed_to)
            .cloned()
            .collect();
        logs.sort_by_key(|log| log.block_number);
        Ok(logs)
    }
}

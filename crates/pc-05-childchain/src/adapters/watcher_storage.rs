use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Hash;

use crate::domain::ChainError;
use crate::ports::EventWatcherStorage;

/// In-memory implementation of EventWatcherStorage for testing
#[derive(Default)]
pub struct InMemoryWatcherStorage {
    loaded: RwLock<Option<u64>>,
    seen: RwLock<HashSet<Hash>>,
}

impl InMemoryWatcherStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventWatcherStorage for InMemoryWatcherStorage {
    async fn get_loaded(&self, initial: u64) -> Result<u64, ChainError> {
        Ok(self.loaded.read().unwrap_or(initial))
    }

    async fn set_loaded(&self, loaded: u64) -> Result<(), ChainError> {
        *self.loaded.write() = Some(loaded);
        Ok(())
    }

    async fn get_seen(&self, tx_hash: &Hash) -> Result<bool, ChainError> {
        Ok(self.seen.read().contains(tx_hash))
    }

    async fn add_seen(&self, tx_hash: &Hash) -> Result<(), ChainError> {
        self.seen.write().insert(*tx_hash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loaded_defaults_to_initial() {
        let storage = InMemoryWatcherStorage::new();
        assert_eq!(storage.get_loaded(5).await.unwrap(), 5);
        storage.set_loaded(9).await.unwrap();
        assert_eq!(storage.get_loaded(5).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_seen() {
        let storage = InMemoryWatcherStorage::new();
        assert!(!storage.get_seen(&[1; 32]).await.unwrap());
        storage.add_seen(&[1; 32]).await.unwrap();
        assert!(storage.get_seen(&[1; 32]).await.unwrap());
    }
}

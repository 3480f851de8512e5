use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::ChainError;
use crate::ports::ChainDb;

/// In-memory implementation of ChainDb for testing
pub struct InMemoryChainDb {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryChainDb {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for InMemoryChainDb {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainDb for InMemoryChainDb {
    async fn contains(&self, key: &str) -> Result<bool, ChainError> {
        Ok(self.entries.read().contains_key(key))
    }

    async fn insert(&self, key: &str, value: Vec<u8>) -> Result<(), ChainError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ChainError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), ChainError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

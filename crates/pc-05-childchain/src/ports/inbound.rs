//! Inbound port: root chain events delivered to the child chain.

use async_trait::async_trait;

use crate::domain::{ChainError, RootChainEvent};

/// Consumer of root chain events.
///
/// Handlers must be idempotent: the watcher delivers at least once.
#[async_trait]
pub trait RootChainEventHandler: Send + Sync {
    /// Apply one event.
    async fn handle_event(&self, event: &RootChainEvent) -> Result<(), ChainError>;
}

//! # Root Chain Event Watcher
//!
//! Polls an `EthEventAdaptor` on a fixed interval and hands new logs to a
//! `RootChainEventHandler`.
//!
//! Delivery is at least once. A log is marked seen only after its handler
//! succeeded or rejected it permanently (see `ChainError::is_permanent`).
//! Any other failure stops the batch before the loaded cursor advances, so
//! the poll is retried from the same block next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::WatcherConfig;
use crate::domain::ChainError;
use crate::ports::{EthEventAdaptor, EventWatcherStorage, RootChainEventHandler};

/// Polls root chain logs and dispatches them.
pub struct EventWatcher {
    adaptor: Arc<dyn EthEventAdaptor>,
    storage: Arc<dyn EventWatcherStorage>,
    handler: Arc<dyn RootChainEventHandler>,
    config: WatcherConfig,
}

impl EventWatcher {
    pub fn new(
        adaptor: Arc<dyn EthEventAdaptor>,
        storage: Arc<dyn EventWatcherStorage>,
        handler: Arc<dyn RootChainEventHandler>,
        config: WatcherConfig,
    ) -> Self {
        Self {
            adaptor,
            storage,
            handler,
            config,
        }
    }

    /// One polling cycle. Returns the number of events applied; permanently
    /// rejected events are skipped and not counted.
    pub async fn poll_once(&self) -> Result<usize, ChainError> {
        let latest = self.adaptor.latest_block_number().await?;
        let loaded = self.storage.get_loaded(self.config.initial_block).await?;
        let confirmed = latest.saturating_sub(self.config.confirmation);
        if confirmed < loaded {
            return Ok(0);
        }

        let logs = self
            .adaptor
            .get_logs(loaded, latest, self.config.confirmation)
            .await?;

        let mut processed = 0;
        for log in logs {
            let Some(tx_hash) = log.transaction_hash else {
                continue;
            };
            if self.storage.get_seen(&tx_hash).await? {
                continue;
            }
            debug!(
                "[pc-05] event {} at root block {}",
                log.event.name(),
                log.block_number
            );
            match self.handler.handle_event(&log.event).await {
                Ok(()) => processed += 1,
                Err(e) if e.is_permanent() => {
                    warn!(
                        "[pc-05] skipping {} event at root block {}: {}",
                        log.event.name(),
                        log.block_number,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
            self.storage.add_seen(&tx_hash).await?;
        }

        // Re-read the boundary block next time; seen hashes absorb the overlap.
        self.storage.set_loaded(confirmed).await?;
        Ok(processed)
    }

    /// Poll every `interval_ms` until `shutdown` turns true.
    ///
    /// `on_complete` is called with the count after every cycle that applied
    /// at least one event. Poll errors are logged and retried next tick.
    pub async fn run<F>(&self, mut shutdown: watch::Receiver<bool>, mut on_complete: F)
    where
        F: FnMut(usize) + Send,
    {
        let mut interval = tokio::time::interval(Duration::from_millis(self.config.interval_ms));
        info!(
            "[pc-05] event watcher started: interval={}ms, confirmation={}",
            self.config.interval_ms, self.config.confirmation
        );
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.poll_once().await {
                        Ok(0) => {}
                        Ok(processed) => on_complete(processed),
                        Err(e) => error!("[pc-05] event poll failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("[pc-05] event watcher stopped");
    }
}

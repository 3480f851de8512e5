//! # Adapters Layer - Child Chain
//!
//! In-memory implementations of the outbound ports, plus a history source
//! backed by a running `Chain`.

pub mod event_source;
pub mod history_source;
pub mod memory_db;
pub mod watcher_storage;

pub use event_source::InMemoryEventSource;
pub use history_source::ChainHistorySource;
pub use memory_db::InMemoryChainDb;
pub use watcher_storage::InMemoryWatcherStorage;

//! # Child Chain Subsystem
//!
//! **Subsystem ID:** 5
//!
//! ## Purpose
//!
//! Drives the child chain: admits signed transactions, folds them into blocks,
//! reacts to root chain events (deposits, submissions, exits, token listings)
//! and persists blocks and snapshots through an abstract key-value store.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | No two queued transactions share an input range | `domain/tx_filter.rs` |
//! | Mutations are serialized per chain | `service.rs` - single `tokio::sync::Mutex` |
//! | Block generation is a sequential fold | `Chain::generate_block` |
//! | Events are applied at least once, deduplicated | `watcher.rs` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - In-memory ChainDb, watcher storage, event source,  │
//! │              chain-backed history source                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - RootChainEventHandler                      │
//! │  ports/outbound.rs - ChainDb, EthEventAdaptor,                  │
//! │                      EventWatcherStorage, HistorySource         │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/tx_filter.rs - TxFilter                                 │
//! │  domain/events.rs    - RootChainEvent, EventLog                 │
//! │  domain/history.rs   - HistoryVerifier                          │
//! │  domain/errors.rs    - ChainError                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `service.rs` holds the `Chain` itself, `watcher.rs` the polling loop and
//! `verifier.rs` the paged, retrying history replay.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod telemetry;
pub mod verifier;
pub mod watcher;

pub use adapters::*;
pub use config::{ChainConfig, TelemetryConfig, WatcherConfig};
pub use domain::*;
pub use ports::*;
pub use service::{BlockGeneration, Chain};
pub use verifier::HistoryVerifier;
pub use watcher::EventWatcher;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # Ports Layer - Child Chain
//!
//! - `inbound`: RootChainEventHandler, implemented by `Chain`
//! - `outbound`: ChainDb, EthEventAdaptor, EventWatcherStorage, HistorySource

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

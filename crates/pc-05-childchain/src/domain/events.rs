//! # Root Chain Events
//!
//! Typed events emitted by the settlement contract, as delivered by an
//! `EthEventAdaptor`.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, Segment, U256};

/// Events the child chain reacts to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootChainEvent {
    /// Coins locked on the root chain.
    Deposit {
        /// Owner of the new coins.
        depositor: Address,
        /// Listed token id.
        token_id: u64,
        /// Token-local start.
        start: U256,
        /// Token-local end.
        end: U256,
        /// Deposit block number.
        blk_num: u64,
    },
    /// The operator's block root was accepted.
    BlockSubmitted {
        /// Root over all roots submitted so far.
        super_root: Hash,
        /// Child chain block root.
        root: Hash,
        /// Assigned block number.
        blk_num: u64,
        /// Root chain timestamp.
        timestamp: u64,
    },
    /// An exit was started for a range.
    ExitStarted {
        /// Exiting party.
        exitor: Address,
        /// Exited range in global coin space.
        segment: Segment,
        /// Block the exit refers to.
        blk_num: u64,
    },
    /// A token was listed.
    TokenListed {
        /// New token id.
        token_id: u64,
        /// Token contract.
        token_address: Address,
    },
}

impl RootChainEvent {
    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            RootChainEvent::Deposit { .. } => "Deposited",
            RootChainEvent::BlockSubmitted { .. } => "BlockSubmitted",
            RootChainEvent::ExitStarted { .. } => "ExitStarted",
            RootChainEvent::TokenListed { .. } => "ListingEvent",
        }
    }
}

/// A root chain log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    /// Emitting transaction. Logs without one are ignored.
    pub transaction_hash: Option<Hash>,
    /// Root chain block the log was included in.
    pub block_number: u64,
    /// Decoded event.
    pub event: RootChainEvent,
}

//! # Segment History
//!
//! Replays what each block proves about a segment against a StateManager.
//! Every item is checked against the block root before anything is applied,
//! so a stale or tampered cache is reported as `HistoryFault::Stale` with the
//! state untouched. Only a well-proven item that does not replay is
//! `HistoryFault::Invalid`.

use std::collections::HashSet;

use pc_01_predicates::StateUpdate;
use pc_03_state_manager::StateManager;
use pc_04_block::CoinProof;
use serde::{Deserialize, Serialize};
use shared_types::{hash_to_hex, Hash};

/// What the root chain recorded for one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockHeader {
    /// A deposit block.
    Deposit {
        /// Block number.
        blk_num: u64,
        /// Deposited state update.
        deposit: StateUpdate,
    },
    /// A submitted transaction block.
    Submitted {
        /// Block number.
        blk_num: u64,
        /// Submitted root.
        root: Hash,
    },
}

impl BlockHeader {
    /// Block number.
    pub fn blk_num(&self) -> u64 {
        match self {
            BlockHeader::Deposit { blk_num, .. } | BlockHeader::Submitted { blk_num, .. } => *blk_num,
        }
    }
}

/// The proofs one block gives about a segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentedBlock {
    /// Block number.
    pub blk_num: u64,
    /// Inclusion, deposit or exclusion items in coin order.
    pub items: Vec<CoinProof>,
}

/// Why a segmented block failed to replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryFault {
    /// The items do not match the block root; refetching may help.
    Stale(String),
    /// The items are proven but do not replay.
    Invalid(String),
}

fn item_root(item: &CoinProof) -> &Hash {
    match item {
        CoinProof::Inclusion(p) => &p.root,
        CoinProof::Deposit(p) => &p.root,
        CoinProof::Exclusion(p) => &p.root,
    }
}

/// Check every item of `block` against `root`, then apply them to `state`.
pub fn apply_segmented_block(
    state: &mut StateManager,
    root: &Hash,
    block: &SegmentedBlock,
) -> Result<(), HistoryFault> {
    for item in &block.items {
        if item.blk_num() != block.blk_num {
            return Err(HistoryFault::Stale(format!(
                "item from block {} in block {}",
                item.blk_num(),
                block.blk_num
            )));
        }
        if item_root(item) != root {
            return Err(HistoryFault::Stale(format!(
                "root mismatch at {}: expected {}",
                item.segment(),
                hash_to_hex(root)
            )));
        }
        if !item.verify() {
            return Err(HistoryFault::Stale(format!(
                "proof check failed at {}",
                item.segment()
            )));
        }
    }

    let mut applied: HashSet<Hash> = HashSet::new();
    for item in &block.items {
        match item {
            CoinProof::Inclusion(p) => {
                let hash = p.signed_tx.hash();
                if !applied.insert(hash) {
                    continue;
                }
                if !state.is_contain(&p.signed_tx) {
                    return Err(HistoryFault::Invalid(format!(
                        "transaction {} in block {} does not spend tracked state",
                        hash_to_hex(&hash),
                        block.blk_num
                    )));
                }
                state.spend(&p.signed_tx);
                state
                    .insert(&p.signed_tx)
                    .map_err(|e| HistoryFault::Invalid(e.to_string()))?;
            }
            CoinProof::Deposit(p) => {
                if !state.contains_update(&p.deposit) {
                    state
                        .insert_deposit_tx(p.deposit.clone())
                        .map_err(|e| HistoryFault::Invalid(e.to_string()))?;
                }
            }
            CoinProof::Exclusion(_) => {}
        }
    }
    Ok(())
}

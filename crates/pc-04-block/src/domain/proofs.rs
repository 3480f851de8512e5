//! # Proof Bundles
//!
//! What a block hands out about a range: the transaction (or deposit) that
//! claimed it, or the gap leaf proving nobody did.

use pc_01_predicates::{SignedTransaction, StateUpdate};
use pc_02_sum_merkle_tree::SumMerkleProof;
use serde::{Deserialize, Serialize};
use shared_types::{coin_space_size, Hash, Segment, ZERO_HASH};

/// A signed transaction plus the inclusion proof of one of its outputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransactionWithProof {
    /// The full signed transaction.
    pub signed_tx: SignedTransaction,
    /// Which output the proof covers.
    pub output_index: usize,
    /// Block the transaction was committed in.
    pub blk_num: u64,
    /// Block root.
    pub root: Hash,
    /// Sum Merkle proof of the output leaf.
    pub proof: SumMerkleProof,
}

impl SignedTransactionWithProof {
    /// The proven output.
    pub fn output(&self) -> Option<&StateUpdate> {
        self.signed_tx.outputs().get(self.output_index)
    }

    /// Segment of the proven output.
    pub fn segment(&self) -> Segment {
        self.proof.segment
    }

    /// Encoded transaction (the leaf preimage).
    pub fn tx_bytes(&self) -> Vec<u8> {
        self.signed_tx.tx().to_bytes()
    }

    /// Raw proof bytes.
    pub fn proof_bytes(&self) -> &[u8] {
        &self.proof.proof
    }

    /// Attached witnesses.
    pub fn signatures(&self) -> &[Vec<u8>] {
        self.signed_tx.witnesses()
    }

    /// Check the leaf is this transaction's output and the proof hangs under
    /// `root`.
    pub fn check_inclusion(&self) -> bool {
        let Some(output) = self.output() else {
            return false;
        };
        self.proof.leaf == self.signed_tx.hash()
            && self.proof.segment == output.segment
            && self
                .proof
                .verify(&self.root, coin_space_size(self.proof.num_tokens))
    }
}

/// A deposit state update plus its inclusion proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositWithProof {
    /// The deposited state update.
    pub deposit: StateUpdate,
    /// Deposit block number.
    pub blk_num: u64,
    /// Block root.
    pub root: Hash,
    /// Sum Merkle proof of the deposit leaf.
    pub proof: SumMerkleProof,
}

impl DepositWithProof {
    /// Check the leaf is this deposit and the proof hangs under `root`.
    pub fn check_inclusion(&self) -> bool {
        self.proof.leaf == self.deposit.hash()
            && self.proof.segment == self.deposit.segment
            && self
                .proof
                .verify(&self.root, coin_space_size(self.proof.num_tokens))
    }
}

/// Proof that a range was not claimed in a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionProof {
    /// Block number.
    pub blk_num: u64,
    /// Block root.
    pub root: Hash,
    /// Sum Merkle proof of the gap leaf.
    pub proof: SumMerkleProof,
}

impl ExclusionProof {
    /// The unclaimed window.
    pub fn segment(&self) -> Segment {
        self.proof.segment
    }

    /// Check the leaf is a gap and the proof hangs under `root`.
    pub fn check_exclusion(&self) -> bool {
        self.proof.leaf == ZERO_HASH
            && self
                .proof
                .verify(&self.root, coin_space_size(self.proof.num_tokens))
    }
}

/// Whatever a block can prove about one coin offset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinProof {
    /// A transaction output claimed the offset.
    Inclusion(SignedTransactionWithProof),
    /// The block's deposit claimed the offset.
    Deposit(DepositWithProof),
    /// Nothing claimed the offset.
    Exclusion(ExclusionProof),
}

impl CoinProof {
    /// Window covered by the proven leaf.
    pub fn segment(&self) -> Segment {
        match self {
            CoinProof::Inclusion(p) => p.segment(),
            CoinProof::Deposit(p) => p.proof.segment,
            CoinProof::Exclusion(p) => p.segment(),
        }
    }

    /// Block number.
    pub fn blk_num(&self) -> u64 {
        match self {
            CoinProof::Inclusion(p) => p.blk_num,
            CoinProof::Deposit(p) => p.blk_num,
            CoinProof::Exclusion(p) => p.blk_num,
        }
    }

    /// Verify the proof against its own root.
    pub fn verify(&self) -> bool {
        match self {
            CoinProof::Inclusion(p) => p.check_inclusion(),
            CoinProof::Deposit(p) => p.check_inclusion(),
            CoinProof::Exclusion(p) => p.check_exclusion(),
        }
    }
}

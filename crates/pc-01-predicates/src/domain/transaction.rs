//! # Transactions
//!
//! A transaction is an ordered, non-empty list of output state updates. Each
//! output consumes exactly the input range equal to its own segment, so the
//! inputs are implied by the outputs.
//!
//! `SignedTransaction` adds the deprecation witnesses. One witness per distinct
//! owner is enough: an input is satisfied when any attached witness verifies
//! against its current state.

use crate::domain::errors::PredicateError;
use crate::domain::state_update::StateUpdate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::{keccak256, Secp256k1KeyPair};
use shared_types::{ByteReader, Hash, Segment};

/// Ordered list of output state updates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    outputs: Vec<StateUpdate>,
}

impl Transaction {
    /// Build a transaction; fails on an empty output list.
    pub fn new(outputs: Vec<StateUpdate>) -> Result<Self, PredicateError> {
        if outputs.is_empty() {
            return Err(PredicateError::EmptyTransaction);
        }
        Ok(Self { outputs })
    }

    /// Output state updates, in order.
    pub fn outputs(&self) -> &[StateUpdate] {
        &self.outputs
    }

    /// Input ranges consumed by this transaction (one per output).
    pub fn input_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.outputs.iter().map(|output| output.segment)
    }

    /// `be4(count) || storage(output)*`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.outputs.len() as u32).to_be_bytes());
        for output in &self.outputs {
            out.extend_from_slice(&output.to_bytes());
        }
        out
    }

    /// Decode from a running reader.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, PredicateError> {
        let count = reader.read_u32()? as usize;
        let mut outputs = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            outputs.push(StateUpdate::read_from(reader)?);
        }
        Self::new(outputs)
    }

    /// Decode a standalone transaction.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PredicateError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        reader.finish()?;
        Ok(tx)
    }

    /// Keccak-256 of `to_bytes()`. This is the message witnesses sign.
    pub fn hash(&self) -> Hash {
        keccak256(&self.to_bytes())
    }
}

/// Transaction plus its deprecation witnesses.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    tx: Transaction,
    #[serde_as(as = "Vec<Bytes>")]
    signatures: Vec<Vec<u8>>,
}

impl SignedTransaction {
    /// Wrap an unsigned transaction.
    pub fn new(tx: Transaction) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    /// Wrap a transaction with pre-computed witnesses.
    pub fn with_witnesses(tx: Transaction, signatures: Vec<Vec<u8>>) -> Self {
        Self { tx, signatures }
    }

    /// Build and wrap a transaction from its outputs.
    pub fn from_outputs(outputs: Vec<StateUpdate>) -> Result<Self, PredicateError> {
        Ok(Self::new(Transaction::new(outputs)?))
    }

    /// Sign the transaction hash and attach the signature as a witness.
    pub fn sign(&mut self, keypair: &Secp256k1KeyPair) -> Result<(), PredicateError> {
        let signature = keypair.sign_hash(&self.tx.hash())?;
        self.signatures.push(signature.to_vec());
        Ok(())
    }

    /// Attach an arbitrary witness (e.g. a multi-party signature bundle).
    pub fn add_witness(&mut self, witness: Vec<u8>) {
        self.signatures.push(witness);
    }

    /// The wrapped transaction.
    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    /// Shortcut for `tx().outputs()`.
    pub fn outputs(&self) -> &[StateUpdate] {
        self.tx.outputs()
    }

    /// Attached witnesses.
    pub fn witnesses(&self) -> &[Vec<u8>] {
        &self.signatures
    }

    /// Transaction hash (witnesses are not part of it).
    pub fn hash(&self) -> Hash {
        self.tx.hash()
    }

    /// `tx_bytes || be4(count) || (be4(len) || witness)*`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.tx.to_bytes();
        out.extend_from_slice(&(self.signatures.len() as u32).to_be_bytes());
        for signature in &self.signatures {
            out.extend_from_slice(&(signature.len() as u32).to_be_bytes());
            out.extend_from_slice(signature);
        }
        out
    }

    /// Inverse of `to_bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PredicateError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Transaction::read_from(&mut reader)?;
        let count = reader.read_u32()? as usize;
        let mut signatures = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let len = reader.read_u32()? as usize;
            signatures.push(reader.take(len)?.to_vec());
        }
        reader.finish()?;
        Ok(Self { tx, signatures })
    }
}

//! # State Update
//!
//! A claim that a segment is governed by a predicate and an opaque state
//! payload as of a block number.
//!
//! ## Encodings
//!
//! - **Canonical** (`encode`): `pad32(predicate) || be32(blk_num) ||
//!   be32(start) || be32(end) || state`. This is the hash preimage the
//!   settlement contract recomputes.
//! - **Storage** (`to_bytes`): `be4(state_len) || canonical`, self-delimiting
//!   so updates can be concatenated.

use crate::domain::errors::PredicateError;
use crate::manager::PredicatesManager;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::keccak256;
use shared_types::{
    address_to_word, u256_to_be32, word_to_address, Address, ByteReader, DecodeError, Hash,
    Segment, U256,
};

/// Claim on `segment` at block `blk_num`, governed by `predicate`.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateUpdate {
    /// Covered coin range.
    pub segment: Segment,
    /// Block number the claim was created in.
    pub blk_num: U256,
    /// Address of the predicate that decides deprecation.
    pub predicate: Address,
    /// Predicate-specific payload.
    #[serde_as(as = "Bytes")]
    pub state: Vec<u8>,
}

impl StateUpdate {
    /// Create a new state update.
    pub fn new(segment: Segment, blk_num: U256, predicate: Address, state: Vec<u8>) -> Self {
        Self {
            segment,
            blk_num,
            predicate,
            state,
        }
    }

    /// Canonical encoding (hash preimage).
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + self.state.len());
        out.extend_from_slice(&address_to_word(&self.predicate));
        out.extend_from_slice(&u256_to_be32(self.blk_num));
        out.extend_from_slice(&u256_to_be32(self.segment.start()));
        out.extend_from_slice(&u256_to_be32(self.segment.end()));
        out.extend_from_slice(&self.state);
        out
    }

    /// Keccak-256 of the canonical encoding.
    pub fn hash(&self) -> Hash {
        keccak256(&self.encode())
    }

    /// Storage encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(132 + self.state.len());
        out.extend_from_slice(&(self.state.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.encode());
        out
    }

    /// Decode a single storage-encoded update, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PredicateError> {
        let mut reader = ByteReader::new(bytes);
        let update = Self::read_from(&mut reader)?;
        reader.finish()?;
        Ok(update)
    }

    /// Decode one storage-encoded update from a running reader.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let state_len = reader.read_u32()? as usize;
        let predicate = word_to_address(&reader.read_word()?);
        let blk_num = reader.read_u256()?;
        let start = reader.read_u256()?;
        let end = reader.read_u256()?;
        let segment = Segment::new(start, end)?;
        let state = reader.take(state_len)?.to_vec();
        Ok(Self {
            segment,
            blk_num,
            predicate,
            state,
        })
    }

    /// Same claim narrowed to `segment`, which must lie inside the current one.
    pub fn get_sub_state_update(&self, segment: Segment) -> Result<StateUpdate, PredicateError> {
        if !self.segment.contains(&segment) {
            return Err(PredicateError::SegmentNotContained {
                current: self.segment,
                requested: segment,
            });
        }
        Ok(StateUpdate {
            segment,
            ..self.clone()
        })
    }

    /// Claims covering what is left of this segment once `other` is removed.
    pub fn get_remaining_state(&self, other: &Segment) -> Vec<StateUpdate> {
        self.segment
            .subtract(other)
            .into_iter()
            .map(|segment| StateUpdate {
                segment,
                ..self.clone()
            })
            .collect()
    }

    /// Ask the governing predicate whether `witness` lets `next` replace this
    /// claim. `hash` is the message the witness signs.
    pub fn verify_deprecation(
        &self,
        hash: &Hash,
        witness: &[u8],
        next: &StateUpdate,
        manager: &PredicatesManager,
    ) -> Result<bool, PredicateError> {
        let predicate = manager
            .get(&self.predicate)
            .ok_or_else(|| PredicateError::unknown_address(&self.predicate))?;
        Ok(predicate.verify_deprecation(hash, self, witness, next))
    }

    /// Ask the governing predicate whether `owner` controls this claim.
    pub fn is_owned_by(
        &self,
        owner: &Address,
        manager: &PredicatesManager,
    ) -> Result<bool, PredicateError> {
        let predicate = manager
            .get(&self.predicate)
            .ok_or_else(|| PredicateError::unknown_address(&self.predicate))?;
        Ok(predicate.is_owned_by(owner, self))
    }
}

//! Two-party channel predicate.
//!
//! State is four words: `channel_hash, participant1, participant2, state_index`.
//! Deprecation needs both participants' signatures, concatenated in order.

use super::{state_words, Predicate};
use crate::domain::StateUpdate;
use shared_crypto::{recover_address, SIGNATURE_LENGTH};
use shared_types::{address_to_word, u256_to_be32, word_to_address, Address, Hash, Segment, U256};

/// Channel predicate requiring both participants.
#[derive(Clone, Copy, Debug, Default)]
pub struct PaymentChannelPredicate;

impl PaymentChannelPredicate {
    /// Registry name.
    pub const NAME: &'static str = "PaymentChannelPredicate";

    /// Build a channel state update.
    pub fn create(
        segment: Segment,
        blk_num: U256,
        predicate: Address,
        channel_hash: Hash,
        participant1: Address,
        participant2: Address,
        state_index: U256,
    ) -> StateUpdate {
        let mut state = Vec::with_capacity(128);
        state.extend_from_slice(&channel_hash);
        state.extend_from_slice(&address_to_word(&participant1));
        state.extend_from_slice(&address_to_word(&participant2));
        state.extend_from_slice(&u256_to_be32(state_index));
        StateUpdate::new(segment, blk_num, predicate, state)
    }

    /// Both participants, in order.
    pub fn participants(update: &StateUpdate) -> Option<(Address, Address)> {
        match state_words(&update.state)?.as_slice() {
            [_, p1, p2, _] => Some((word_to_address(p1), word_to_address(p2))),
            _ => None,
        }
    }
}

impl Predicate for PaymentChannelPredicate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn verify_deprecation(
        &self,
        hash: &Hash,
        current: &StateUpdate,
        witness: &[u8],
        next: &StateUpdate,
    ) -> bool {
        if !current.segment.contains(&next.segment) || witness.len() != 2 * SIGNATURE_LENGTH {
            return false;
        }
        let Some((participant1, participant2)) = Self::participants(current) else {
            return false;
        };
        let (sig1, sig2) = witness.split_at(SIGNATURE_LENGTH);
        matches!(recover_address(hash, sig1), Ok(signer) if signer == participant1)
            && matches!(recover_address(hash, sig2), Ok(signer) if signer == participant2)
    }

    fn is_owned_by(&self, owner: &Address, current: &StateUpdate) -> bool {
        Self::participants(current)
            .map(|(p1, p2)| p1 == *owner || p2 == *owner)
            .unwrap_or(false)
    }
}

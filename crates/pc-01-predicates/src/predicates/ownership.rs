//! Single-owner predicate. State is one word holding the owner address.

use super::{state_words, Predicate};
use crate::domain::StateUpdate;
use shared_crypto::recover_address;
use shared_types::{address_to_word, word_to_address, Address, Hash, Segment, U256};
use tracing::trace;

/// Owner-signature predicate.
#[derive(Clone, Copy, Debug, Default)]
pub struct OwnershipPredicate;

impl OwnershipPredicate {
    /// Registry name.
    pub const NAME: &'static str = "OwnershipPredicate";

    /// Build a state update owned by `owner` under the predicate at `predicate`.
    pub fn create(segment: Segment, blk_num: U256, predicate: Address, owner: Address) -> StateUpdate {
        StateUpdate::new(segment, blk_num, predicate, address_to_word(&owner).to_vec())
    }

    /// Decode the owner from an ownership state payload.
    pub fn owner_of(update: &StateUpdate) -> Option<Address> {
        match state_words(&update.state)?.as_slice() {
            [word] => Some(word_to_address(word)),
            _ => None,
        }
    }
}

impl Predicate for OwnershipPredicate {
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
        if !current.segment.contains(&next.segment) {
            return false;
        }
        let Some(owner) = Self::owner_of(current) else {
            return false;
        };
        match recover_address(hash, witness) {
            Ok(signer) => signer == owner,
            Err(e) => {
                trace!("[pc-01] ownership witness rejected: {}", e);
                false
            }
        }
    }

    fn is_owned_by(&self, owner: &Address, current: &StateUpdate) -> bool {
        Self::owner_of(current).as_ref() == Some(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::{keccak256, Secp256k1KeyPair};

    const PREDICATE: Address = [0x99; 20];

    fn owned_by(owner: Address, start: u64, end: u64) -> StateUpdate {
        OwnershipPredicate::create(
            Segment::from_u64(start, end).unwrap(),
            U256::from(1),
            PREDICATE,
            owner,
        )
    }

    #[test]
    fn test_owner_signature_deprecates() {
        let alice = Secp256k1KeyPair::generate();
        let current = owned_by(alice.address(), 0, 100);
        let next = owned_by([0x01; 20], 10, 20);
        let hash = keccak256(b"tx");
        let witness = alice.sign_hash(&hash).unwrap().to_vec();

        assert!(OwnershipPredicate.verify_deprecation(&hash, &current, &witness, &next));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let alice = Secp256k1KeyPair::generate();
        let mallory = Secp256k1KeyPair::generate();
        let current = owned_by(alice.address(), 0, 100);
        let next = owned_by(mallory.address(), 0, 100);
        let hash = keccak256(b"tx");
        let witness = mallory.sign_hash(&hash).unwrap().to_vec();

        assert!(!OwnershipPredicate.verify_deprecation(&hash, &current, &witness, &next));
    }

    #[test]
    fn test_next_outside_current_rejected() {
        let alice = Secp256k1KeyPair::generate();
        let current = owned_by(alice.address(), 0, 100);
        let next = owned_by(alice.address(), 50, 150);
        let hash = keccak256(b"tx");
        let witness = alice.sign_hash(&hash).unwrap().to_vec();

        assert!(!OwnershipPredicate.verify_deprecation(&hash, &current, &witness, &next));
    }

    #[test]
    fn test_malformed_inputs_are_false() {
        let alice = Secp256k1KeyPair::generate();
        let mut current = owned_by(alice.address(), 0, 100);
        let next = current.clone();
        let hash = keccak256(b"tx");
        assert!(!OwnershipPredicate.verify_deprecation(&hash, &current, &[0u8; 3], &next));

        current.state.push(0);
        let witness = alice.sign_hash(&hash).unwrap().to_vec();
        assert!(!OwnershipPredicate.verify_deprecation(&hash, &current, &witness, &next));
        assert!(!OwnershipPredicate.is_owned_by(&alice.address(), &current));
    }

    #[test]
    fn test_is_owned_by() {
        let current = owned_by([0x42; 20], 0, 1);
        assert!(OwnershipPredicate.is_owned_by(&[0x42; 20], &current));
        assert!(!OwnershipPredicate.is_owned_by(&[0x43; 20], &current));
    }
}

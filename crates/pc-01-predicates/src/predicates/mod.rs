//! # Predicates
//!
//! A predicate decides who may deprecate a state update and who owns it.
//! Consumers only see the `Predicate` trait; new variants are registered with
//! `PredicatesManager::register`.

mod ownership;
mod payment_channel;

pub use ownership::OwnershipPredicate;
pub use payment_channel::PaymentChannelPredicate;

use crate::domain::StateUpdate;
use shared_types::{Address, Hash};

/// Deprecation and ownership rules for a family of state updates.
pub trait Predicate: Send + Sync {
    /// Registry name of this variant.
    fn name(&self) -> &'static str;

    /// True iff `witness` authorizes replacing `current` with `next`, where
    /// `hash` is the signed message (the transaction hash).
    ///
    /// Malformed state or witness bytes yield `false`.
    fn verify_deprecation(
        &self,
        hash: &Hash,
        current: &StateUpdate,
        witness: &[u8],
        next: &StateUpdate,
    ) -> bool;

    /// True iff `owner` controls `current`.
    fn is_owned_by(&self, owner: &Address, current: &StateUpdate) -> bool;
}

/// Split a state payload into 32-byte words; `None` unless the length is a
/// multiple of 32.
pub(crate) fn state_words(state: &[u8]) -> Option<Vec<[u8; 32]>> {
    if state.len() % 32 != 0 {
        return None;
    }
    Some(
        state
            .chunks_exact(32)
            .map(|chunk| {
                let mut word = [0u8; 32];
                word.copy_from_slice(chunk);
                word
            })
            .collect(),
    )
}

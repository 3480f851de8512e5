//! # Predicates Manager
//!
//! Registry mapping predicate contract addresses to verification strategies,
//! with a reverse index from registry name to address.

use crate::domain::{PredicateError, StateUpdate};
use crate::predicates::{OwnershipPredicate, PaymentChannelPredicate, Predicate};
use shared_types::{address_to_hex, Address, Hash};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Address-keyed registry of predicate strategies.
#[derive(Clone, Default)]
pub struct PredicatesManager {
    predicates: HashMap<Address, Arc<dyn Predicate>>,
    name_to_address: HashMap<String, Address>,
}

impl PredicatesManager {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built-in predicate by name.
    pub fn add_predicate(&mut self, address: Address, name: &str) -> Result<(), PredicateError> {
        let predicate: Arc<dyn Predicate> = match name {
            OwnershipPredicate::NAME => Arc::new(OwnershipPredicate),
            PaymentChannelPredicate::NAME => Arc::new(PaymentChannelPredicate),
            other => return Err(PredicateError::UnknownPredicate(other.to_string())),
        };
        self.register(address, name, predicate);
        Ok(())
    }

    /// Register a custom predicate variant.
    pub fn register(&mut self, address: Address, name: &str, predicate: Arc<dyn Predicate>) {
        debug!(
            "[pc-01] registering predicate {} at {}",
            name,
            address_to_hex(&address)
        );
        self.predicates.insert(address, predicate);
        self.name_to_address.insert(name.to_string(), address);
    }

    /// Address registered under `name`.
    pub fn get_native_predicate(&self, name: &str) -> Result<Address, PredicateError> {
        self.name_to_address
            .get(name)
            .copied()
            .ok_or_else(|| PredicateError::UnknownPredicate(name.to_string()))
    }

    /// Strategy registered at `address`.
    pub fn get(&self, address: &Address) -> Option<Arc<dyn Predicate>> {
        self.predicates.get(address).cloned()
    }

    /// True if a strategy is registered at `address`.
    pub fn contains(&self, address: &Address) -> bool {
        self.predicates.contains_key(address)
    }

    /// Dispatch to the registered strategy. Unregistered addresses verify as
    /// `false`.
    pub fn verify_deprecation(
        &self,
        predicate: &Address,
        hash: &Hash,
        current: &StateUpdate,
        witness: &[u8],
        next: &StateUpdate,
    ) -> bool {
        match self.predicates.get(predicate) {
            Some(strategy) => strategy.verify_deprecation(hash, current, witness, next),
            None => false,
        }
    }

    /// Dispatch to the registered strategy. Unregistered addresses own nothing.
    pub fn is_owned_by(&self, predicate: &Address, owner: &Address, current: &StateUpdate) -> bool {
        self.predicates
            .get(predicate)
            .map(|strategy| strategy.is_owned_by(owner, current))
            .unwrap_or(false)
    }
}

impl fmt::Debug for PredicatesManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.name_to_address.keys().collect();
        names.sort();
        f.debug_struct("PredicatesManager")
            .field("predicates", &names)
            .finish()
    }
}

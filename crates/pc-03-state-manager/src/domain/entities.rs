//! Tracked entries of the state manager.

use pc_01_predicates::StateUpdate;
use serde::{Deserialize, Serialize};

/// A current state update plus its exit flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedState {
    /// Current claim on the range.
    pub update: StateUpdate,
    /// Set once an exit was started on the range.
    pub exiting: bool,
}

impl TrackedState {
    /// Entry that is not exiting.
    pub fn active(update: StateUpdate) -> Self {
        Self {
            update,
            exiting: false,
        }
    }
}

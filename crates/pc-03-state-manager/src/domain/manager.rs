//! # State Manager
//!
//! Ordered map from segment start to the tracked entry covering that range.
//! Because entries never overlap, ordering by start also orders them by end,
//! which keeps container and overlap lookups to a single range scan.

use std::collections::BTreeMap;
use std::sync::Arc;

use pc_01_predicates::{PredicatesManager, SignedTransaction, StateUpdate};
use shared_types::{Address, Segment, U256};
use tracing::{debug, trace, warn};

use super::entities::TrackedState;
use super::errors::StateManagerError;

/// Authoritative partition of the coin space into current state updates.
#[derive(Clone, Debug)]
pub struct StateManager {
    predicates: Arc<PredicatesManager>,
    states: BTreeMap<U256, TrackedState>,
}

impl StateManager {
    /// Empty manager using `predicates` for deprecation checks.
    pub fn new(predicates: Arc<PredicatesManager>) -> Self {
        Self {
            predicates,
            states: BTreeMap::new(),
        }
    }

    /// Predicate registry in use.
    pub fn predicates(&self) -> &Arc<PredicatesManager> {
        &self.predicates
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    /// Entries overlapping `segment`, in descending start order.
    fn overlapping<'a>(&'a self, segment: &'a Segment) -> impl Iterator<Item = &'a TrackedState> + 'a {
        self.states
            .range(..segment.end())
            .rev()
            .map(|(_, state)| state)
            .take_while(move |state| state.update.segment.end() > segment.start())
    }

    fn has_overlap(&self, segment: &Segment) -> bool {
        self.overlapping(segment).next().is_some()
    }

    /// The tracked entry whose segment contains `segment`.
    pub fn find_container(&self, segment: &Segment) -> Option<&TrackedState> {
        self.states
            .range(..=segment.start())
            .next_back()
            .map(|(_, state)| state)
            .filter(|state| state.update.segment.contains(segment))
    }

    /// True if exactly `update` is tracked (same segment, block, predicate, state).
    pub fn contains_update(&self, update: &StateUpdate) -> bool {
        self.states
            .get(&update.segment.start())
            .map(|state| state.update == *update)
            .unwrap_or(false)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Track a freshly deposited range.
    pub fn insert_deposit_tx(&mut self, update: StateUpdate) -> Result<(), StateManagerError> {
        if self.has_overlap(&update.segment) {
            return Err(StateManagerError::SegmentAlreadyClaimed(update.segment));
        }
        debug!("[pc-03] deposit tracked: {}", update.segment);
        self.states
            .insert(update.segment.start(), TrackedState::active(update));
        Ok(())
    }

    /// True iff every output of `tx` is covered by a non-exiting entry whose
    /// predicate accepts one of the attached witnesses, and no two outputs
    /// overlap.
    pub fn is_contain(&self, tx: &SignedTransaction) -> bool {
        if outputs_overlap(tx.outputs()) {
            trace!("[pc-03] transaction outputs overlap each other");
            return false;
        }
        let hash = tx.hash();
        tx.outputs().iter().all(|output| {
            let Some(current) = self.find_container(&output.segment) else {
                trace!("[pc-03] no tracked range contains {}", output.segment);
                return false;
            };
            if current.exiting {
                trace!("[pc-03] range {} is exiting", output.segment);
                return false;
            }
            tx.witnesses().iter().any(|witness| {
                match current
                    .update
                    .verify_deprecation(&hash, witness, output, &self.predicates)
                {
                    Ok(valid) => valid,
                    Err(e) => {
                        warn!("[pc-03] cannot verify deprecation: {}", e);
                        false
                    }
                }
            })
        })
    }

    /// Consume the inputs of `tx`. Returns the consumed sub-ranges of the
    /// previous state updates, or an empty list (and no mutation) if
    /// `is_contain(tx)` does not hold.
    pub fn spend(&mut self, tx: &SignedTransaction) -> Vec<StateUpdate> {
        if !self.is_contain(tx) {
            return Vec::new();
        }

        let mut consumed = Vec::with_capacity(tx.outputs().len());
        for output in tx.outputs() {
            let Some(start) = self
                .find_container(&output.segment)
                .map(|state| state.update.segment.start())
            else {
                continue;
            };
            let Some(current) = self.states.remove(&start) else {
                continue;
            };
            for remaining in current.update.get_remaining_state(&output.segment) {
                self.states
                    .insert(remaining.segment.start(), TrackedState::active(remaining));
            }
            consumed.push(StateUpdate {
                segment: output.segment,
                ..current.update
            });
        }
        debug!(
            "[pc-03] spent {} input(s) of tx 0x{}",
            consumed.len(),
            hex::encode(&tx.hash()[..8])
        );
        consumed
    }

    /// Install the outputs of `tx`. Fails without mutation if any output
    /// overlaps a tracked entry or another output.
    pub fn insert(&mut self, tx: &SignedTransaction) -> Result<(), StateManagerError> {
        if let Some(output) = tx
            .outputs()
            .iter()
            .find(|output| self.has_overlap(&output.segment))
        {
            return Err(StateManagerError::SegmentAlreadyClaimed(output.segment));
        }
        if outputs_overlap(tx.outputs()) {
            let segment = tx.outputs()[0].segment;
            return Err(StateManagerError::SegmentAlreadyClaimed(segment));
        }
        for output in tx.outputs() {
            self.states
                .insert(output.segment.start(), TrackedState::active(output.clone()));
        }
        Ok(())
    }

    /// Mark `segment` as exiting, splitting its container if needed.
    ///
    /// Idempotent for ranges already exiting.
    pub fn start_exit(&mut self, segment: &Segment) -> Result<(), StateManagerError> {
        let start = match self.find_container(segment) {
            Some(state) if state.exiting => return Ok(()),
            Some(state) => state.update.segment.start(),
            None => return Err(StateManagerError::SegmentNotTracked(*segment)),
        };
        let Some(current) = self.states.remove(&start) else {
            return Err(StateManagerError::SegmentNotTracked(*segment));
        };

        for remaining in current.update.get_remaining_state(segment) {
            self.states
                .insert(remaining.segment.start(), TrackedState::active(remaining));
        }
        let exiting = StateUpdate {
            segment: *segment,
            ..current.update
        };
        self.states.insert(
            segment.start(),
            TrackedState {
                update: exiting,
                exiting: true,
            },
        );
        debug!("[pc-03] exit started for {}", segment);
        Ok(())
    }

    /// Mark every tracked part of `segment` as exiting, splitting the entries
    /// it cuts through. Untracked gaps are ignored.
    ///
    /// Returns the newly marked ranges in ascending order.
    pub fn mark_exiting(&mut self, segment: &Segment) -> Vec<Segment> {
        let starts: Vec<U256> = self
            .overlapping(segment)
            .filter(|state| !state.exiting)
            .map(|state| state.update.segment.start())
            .collect();

        let mut marked = Vec::with_capacity(starts.len());
        for start in starts.into_iter().rev() {
            let Some(current) = self.states.remove(&start) else {
                continue;
            };
            let Some(covered) = current.update.segment.intersect(segment) else {
                self.states.insert(start, current);
                continue;
            };
            for remaining in current.update.get_remaining_state(&covered) {
                self.states
                    .insert(remaining.segment.start(), TrackedState::active(remaining));
            }
            self.states.insert(
                covered.start(),
                TrackedState {
                    update: StateUpdate {
                        segment: covered,
                        ..current.update
                    },
                    exiting: true,
                },
            );
            marked.push(covered);
        }
        debug!(
            "[pc-03] exit over {} marked {} range(s)",
            segment,
            marked.len()
        );
        marked
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    /// Non-exiting state updates, ordered by segment start.
    pub fn get_state_updates(&self) -> Vec<StateUpdate> {
        self.states
            .values()
            .filter(|state| !state.exiting)
            .map(|state| state.update.clone())
            .collect()
    }

    /// Exiting state updates, ordered by segment start.
    pub fn get_exiting(&self) -> Vec<StateUpdate> {
        self.states
            .values()
            .filter(|state| state.exiting)
            .map(|state| state.update.clone())
            .collect()
    }

    /// Non-exiting state updates owned by `owner`.
    pub fn get_owned(&self, owner: &Address) -> Vec<StateUpdate> {
        self.states
            .values()
            .filter(|state| !state.exiting)
            .filter(|state| {
                self.predicates
                    .is_owned_by(&state.update.predicate, owner, &state.update)
            })
            .map(|state| state.update.clone())
            .collect()
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    /// Length-prefixed list of tracked entries, ordered by segment start.
    pub fn serialize(&self) -> Result<Vec<u8>, StateManagerError> {
        let entries: Vec<&TrackedState> = self.states.values().collect();
        bincode::serialize(&entries).map_err(|e| StateManagerError::Serialization(e.to_string()))
    }

    /// Rebuild a manager from `serialize` output.
    pub fn deserialize(
        predicates: Arc<PredicatesManager>,
        bytes: &[u8],
    ) -> Result<Self, StateManagerError> {
        let entries: Vec<TrackedState> = bincode::deserialize(bytes)
            .map_err(|e| StateManagerError::CorruptSnapshot(e.to_string()))?;
        let mut manager = Self::new(predicates);
        for entry in entries {
            if manager.has_overlap(&entry.update.segment) {
                return Err(StateManagerError::CorruptSnapshot(format!(
                    "overlapping entry {}",
                    entry.update.segment
                )));
            }
            manager.states.insert(entry.update.segment.start(), entry);
        }
        Ok(manager)
    }
}

/// True if any two outputs overlap.
fn outputs_overlap(outputs: &[StateUpdate]) -> bool {
    let mut segments: Vec<Segment> = outputs.iter().map(|output| output.segment).collect();
    segments.sort();
    segments.windows(2).any(|pair| pair[0].overlaps(&pair[1]))
}

//! Validity fan-in with exclusion.

use std::collections::BTreeSet;

use crate::reactive::StateView;
use crate::validity::Validity;

/// Tracks which included members are invalid or pending.
///
/// Keys default to member names; multi-source adapters key by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityReducer<K: Ord = String> {
    invalid: BTreeSet<K>,
    pending: BTreeSet<K>,
}

impl<K: Ord + Clone> ValidityReducer<K> {
    pub fn new() -> Self {
        Self {
            invalid: BTreeSet::new(),
            pending: BTreeSet::new(),
        }
    }

    /// Seed from the members' current states.
    pub fn with_members<S: StateView>(members: impl IntoIterator<Item = (K, S)>) -> Self {
        let mut reducer = Self::new();
        for (key, state) in members {
            reducer.process_member_state_update(key, &state);
        }
        reducer
    }

    /// Record a member's latest state. Excluded members are forgotten.
    pub fn process_member_state_update(&mut self, key: K, state: &impl StateView) {
        self.invalid.remove(&key);
        self.pending.remove(&key);
        if state.is_excluded() {
            return;
        }
        match state.validity() {
            Validity::Invalid => {
                self.invalid.insert(key);
            }
            Validity::Pending => {
                self.pending.insert(key);
            }
            Validity::Valid => {}
        }
    }

    pub fn remove(&mut self, key: &K) {
        self.invalid.remove(key);
        self.pending.remove(key);
    }

    pub fn validity(&self) -> Validity {
        if !self.invalid.is_empty() {
            Validity::Invalid
        } else if !self.pending.is_empty() {
            Validity::Pending
        } else {
            Validity::Valid
        }
    }

    pub fn invalid_keys(&self) -> impl Iterator<Item = &K> {
        self.invalid.iter()
    }

    pub fn pending_keys(&self) -> impl Iterator<Item = &K> {
        self.pending.iter()
    }
}

impl<K: Ord + Clone> Default for ValidityReducer<K> {
    fn default() -> Self {
        Self::new()
    }
}

//! Last-active sub-state tracking.
//!
//! Every exit records the exiting state as its super-state's last active
//! sub-state. Recording is unconditional; only retrieval is gated by a
//! state's [`HistoryType`](crate::core::HistoryType).

use crate::core::state::StateId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Map from super-state to its last active direct sub-state.
///
/// # Example
///
/// ```rust
/// use statetree::core::HistoryStates;
///
/// let mut history = HistoryStates::new();
/// history.record("Playing", "Track1");
/// history.record("Playing", "Track2");
///
/// assert_eq!(history.last_active(&"Playing"), Some(&"Track2"));
/// assert_eq!(history.last_active(&"Stopped"), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryStates<S: StateId> {
    last_active: HashMap<S, S>,
}

impl<S: StateId> Default for HistoryStates<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateId> HistoryStates<S> {
    pub fn new() -> Self {
        Self {
            last_active: HashMap::new(),
        }
    }

    pub fn from_map(last_active: HashMap<S, S>) -> Self {
        Self { last_active }
    }

    /// Record `sub_state` as the last active sub-state of `super_state`.
    pub fn record(&mut self, super_state: S, sub_state: S) {
        self.last_active.insert(super_state, sub_state);
    }

    pub fn last_active(&self, super_state: &S) -> Option<&S> {
        self.last_active.get(super_state)
    }

    pub fn as_map(&self) -> &HashMap<S, S> {
        &self.last_active
    }

    pub fn into_map(self) -> HashMap<S, S> {
        self.last_active
    }

    /// Flatten into a list of entries, a shape every serializer can carry.
    pub fn entries(&self) -> Vec<HistoryEntry<S>> {
        self.last_active
            .iter()
            .map(|(super_state, last_active)| HistoryEntry {
                super_state: super_state.clone(),
                last_active: last_active.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.last_active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_active.is_empty()
    }
}

impl<S: StateId> FromIterator<HistoryEntry<S>> for HistoryStates<S> {
    fn from_iter<T: IntoIterator<Item = HistoryEntry<S>>>(iter: T) -> Self {
        Self {
            last_active: iter
                .into_iter()
                .map(|entry| (entry.super_state, entry.last_active))
                .collect(),
        }
    }
}

/// One persisted history record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry<S> {
    pub super_state: S,
    pub last_active: S,
}

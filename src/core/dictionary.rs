//! The arena of state definitions and the complete machine definition.

use crate::core::state::{EventArgument, EventId, StateDefinition, StateId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Owning map of every state definition, keyed by state id.
///
/// Hierarchy links inside a [`StateDefinition`] are ids resolved through
/// this dictionary.
pub struct StateDefinitionDictionary<S: StateId, E: EventId, A: EventArgument> {
    states: HashMap<S, StateDefinition<S, E, A>>,
}

impl<S: StateId, E: EventId, A: EventArgument> StateDefinitionDictionary<S, E, A> {
    pub(crate) fn new(states: HashMap<S, StateDefinition<S, E, A>>) -> Self {
        Self { states }
    }

    pub fn get(&self, state: &S) -> Option<&StateDefinition<S, E, A>> {
        self.states.get(state)
    }

    pub fn contains(&self, state: &S) -> bool {
        self.states.contains_key(state)
    }

    pub fn states(&self) -> impl Iterator<Item = &StateDefinition<S, E, A>> {
        self.states.values()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Depth of `state` in the hierarchy; root states are at level 0.
    pub fn level(&self, state: &S) -> usize {
        self.path_to_root(state).len().saturating_sub(1)
    }

    /// The chain from `state` up to its root, `state` first.
    ///
    /// Unknown ids end the walk. The walk is bounded by the number of states,
    /// so it terminates even on a hierarchy that was never validated.
    pub fn path_to_root(&self, state: &S) -> Vec<&StateDefinition<S, E, A>> {
        let mut path = Vec::new();
        let mut current = self.states.get(state);
        while let Some(definition) = current {
            if path.len() > self.states.len() {
                break;
            }
            path.push(definition);
            current = definition
                .super_state
                .as_ref()
                .and_then(|parent| self.states.get(parent));
        }
        path
    }

    /// Whether `ancestor` is `state` or one of its (transitive) super-states.
    pub fn is_ancestor_or_self(&self, ancestor: &S, state: &S) -> bool {
        self.path_to_root(state)
            .iter()
            .any(|definition| definition.id == *ancestor)
    }

    /// Root states, i.e. states without a super-state.
    pub fn roots(&self) -> impl Iterator<Item = &StateDefinition<S, E, A>> {
        self.states
            .values()
            .filter(|definition| definition.super_state.is_none())
    }
}

impl<S: StateId, E: EventId, A: EventArgument> fmt::Debug for StateDefinitionDictionary<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.states.iter()).finish()
    }
}

/// Everything needed to create a state machine: the validated state
/// dictionary, the initial state and the initially recorded history.
pub struct MachineDefinition<S: StateId, E: EventId, A: EventArgument> {
    pub(crate) dictionary: Arc<StateDefinitionDictionary<S, E, A>>,
    pub(crate) initial_state: S,
    pub(crate) initially_last_active_states: HashMap<S, S>,
}

impl<S: StateId, E: EventId, A: EventArgument> MachineDefinition<S, E, A> {
    pub fn dictionary(&self) -> &StateDefinitionDictionary<S, E, A> {
        &self.dictionary
    }

    pub fn initial_state(&self) -> &S {
        &self.initial_state
    }

    pub fn initially_last_active_states(&self) -> &HashMap<S, S> {
        &self.initially_last_active_states
    }
}

impl<S: StateId, E: EventId, A: EventArgument> Clone for MachineDefinition<S, E, A> {
    fn clone(&self) -> Self {
        Self {
            dictionary: Arc::clone(&self.dictionary),
            initial_state: self.initial_state.clone(),
            initially_last_active_states: self.initially_last_active_states.clone(),
        }
    }
}

impl<S: StateId, E: EventId, A: EventArgument> fmt::Debug for MachineDefinition<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineDefinition")
            .field("initial_state", &self.initial_state)
            .field("states", &self.dictionary.len())
            .finish()
    }
}

//! Hook for describing a machine's structure.

use crate::core::{EventArgument, EventId, StateDefinitionDictionary, StateId};

/// Generates a description of a state machine from its definition, e.g. a
/// diagram or a textual listing.
pub trait StateMachineReport<S: StateId, E: EventId, A: EventArgument> {
    fn report(&self, name: &str, states: &StateDefinitionDictionary<S, E, A>, initial_state: &S);
}

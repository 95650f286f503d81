//! Builder for super-state/sub-state relationships.

use crate::builder::machine::StateMachineBuilder;
use crate::core::{EventArgument, EventId, HistoryType, StateId};

/// Declares the sub-states of one super-state.
pub struct HierarchyBuilder<'a, S: StateId, E: EventId, A: EventArgument> {
    machine: &'a mut StateMachineBuilder<S, E, A>,
    super_state: S,
}

impl<'a, S: StateId, E: EventId, A: EventArgument> HierarchyBuilder<'a, S, E, A> {
    pub(crate) fn new(machine: &'a mut StateMachineBuilder<S, E, A>, super_state: S) -> Self {
        Self {
            machine,
            super_state,
        }
    }

    /// Set how the super-state is re-entered (defaults to `HistoryType::None`).
    pub fn with_history_type(self, history_type: HistoryType) -> Self {
        self.machine.state_mut(&self.super_state).history_type = history_type;
        self
    }

    /// Add a sub-state and make it the one entered by default.
    pub fn with_initial_sub_state(self, sub_state: S) -> Self {
        self.machine.attach_sub_state(&self.super_state, &sub_state);
        self.machine
            .set_initial_sub_state(&self.super_state, &sub_state);
        self
    }

    pub fn with_sub_state(self, sub_state: S) -> Self {
        self.machine.attach_sub_state(&self.super_state, &sub_state);
        self
    }
}

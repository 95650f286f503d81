//! Builder for the entry actions, exit actions and transitions of one state.

use crate::builder::machine::StateMachineBuilder;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Action, EventArgument, EventId, StateId};

pub struct StateBuilder<'a, S: StateId, E: EventId, A: EventArgument> {
    machine: &'a mut StateMachineBuilder<S, E, A>,
    state: S,
}

impl<'a, S: StateId, E: EventId, A: EventArgument> StateBuilder<'a, S, E, A> {
    pub(crate) fn new(machine: &'a mut StateMachineBuilder<S, E, A>, state: S) -> Self {
        Self { machine, state }
    }

    /// Add an action run whenever the state is entered.
    pub fn on_entry(self, action: Action<A>) -> Self {
        self.machine.state_mut(&self.state).entry_actions.push(action);
        self
    }

    /// Add an action run whenever the state is exited.
    pub fn on_exit(self, action: Action<A>) -> Self {
        self.machine.state_mut(&self.state).exit_actions.push(action);
        self
    }

    /// Start declaring transitions for `event`.
    pub fn on(self, event: E) -> TransitionBuilder<'a, S, E, A> {
        TransitionBuilder::new(self.machine, self.state, event)
    }
}

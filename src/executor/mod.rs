//! Executors deliver queued events to a [`StateMachine`](crate::engine::StateMachine)
//! one at a time.
//!
//! - [`PassiveStateMachine`]: processes events on the calling thread; reentrant.
//! - [`ActiveStateMachine`]: processes events on a dedicated worker thread.
//! - [`AsyncStateMachine`]: processes events on a Tokio task.
//!
//! All three share the same queue semantics: normal events are processed in
//! the order they were fired, priority events before any queued normal event
//! (the most recent priority event first), and the initial state is entered
//! lazily on the first drain after `initialize()`.

mod active;
mod asynchronous;
mod config;
mod macros;
mod passive;
mod queue;

pub use active::ActiveStateMachine;
pub use asynchronous::AsyncStateMachine;
pub use config::ActiveConfig;
pub use passive::PassiveStateMachine;

use crate::core::{EventArgument, EventId, MachineDefinition, StateId};

impl<S: StateId, E: EventId, A: EventArgument> MachineDefinition<S, E, A> {
    pub fn create_passive_state_machine(
        &self,
        name: impl Into<String>,
    ) -> PassiveStateMachine<S, E, A> {
        PassiveStateMachine::new(name, self.clone())
    }

    pub fn create_active_state_machine(
        &self,
        name: impl Into<String>,
        config: ActiveConfig,
    ) -> ActiveStateMachine<S, E, A> {
        ActiveStateMachine::new(name, self.clone(), config)
    }

    pub fn create_async_state_machine(
        &self,
        name: impl Into<String>,
    ) -> AsyncStateMachine<S, E, A> {
        AsyncStateMachine::new(name, self.clone())
    }
}

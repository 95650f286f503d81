//! Extensions observe the state machine at every lifecycle point.
//!
//! Extensions run in registration order. Hooks named `handling_*` (and
//! [`Extension::firing_event`]) receive a value and return its replacement;
//! the host folds the value through all extensions left to right, so an
//! extension can substitute an error or event for everything that follows.
//! The matching `handled_*` hooks are informational and see the final value.

mod logging;

pub use logging::LoggingExtension;

use crate::core::{
    ActionError, EventArgument, EventId, EventInformation, HistoryStates, StateId,
    TransitionDefinition,
};
use crate::engine::TransitionContext;
use parking_lot::RwLock;
use std::sync::Arc;

/// Observer of state machine lifecycle events. Every hook has a no-op default.
#[allow(unused_variables)]
pub trait Extension<S: StateId, E: EventId, A: EventArgument>: Send + Sync {
    fn started(&self, machine: &str) {}

    fn stopped(&self, machine: &str) {}

    fn event_queued(&self, machine: &str, event: &EventInformation<E, A>) {}

    fn event_queued_with_priority(&self, machine: &str, event: &EventInformation<E, A>) {}

    fn entering_initial_state(&self, machine: &str, state: &S) {}

    fn entered_initial_state(&self, machine: &str, state: &S, context: &TransitionContext<S, E, A>) {
    }

    /// Called before an event is processed; may replace the event or its argument.
    fn firing_event(
        &self,
        machine: &str,
        event: EventInformation<E, A>,
    ) -> EventInformation<E, A> {
        event
    }

    fn fired_event(&self, machine: &str, context: &TransitionContext<S, E, A>) {}

    fn switched_state(&self, machine: &str, old_state: Option<&S>, new_state: &S) {}

    fn entering_state(&self, machine: &str, state: &S, context: &TransitionContext<S, E, A>) {}

    /// A candidate transition whose guard did not match.
    fn skipped_transition(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        context: &TransitionContext<S, E, A>,
    ) {
    }

    fn executing_transition(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        context: &TransitionContext<S, E, A>,
    ) {
    }

    fn executed_transition(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        context: &TransitionContext<S, E, A>,
    ) {
    }

    fn handling_guard_exception(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        context: &TransitionContext<S, E, A>,
        error: ActionError,
    ) -> ActionError {
        error
    }

    fn handled_guard_exception(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        context: &TransitionContext<S, E, A>,
        error: &ActionError,
    ) {
    }

    fn handling_entry_action_exception(
        &self,
        machine: &str,
        state: &S,
        context: &TransitionContext<S, E, A>,
        error: ActionError,
    ) -> ActionError {
        error
    }

    fn handled_entry_action_exception(
        &self,
        machine: &str,
        state: &S,
        context: &TransitionContext<S, E, A>,
        error: &ActionError,
    ) {
    }

    fn handling_exit_action_exception(
        &self,
        machine: &str,
        state: &S,
        context: &TransitionContext<S, E, A>,
        error: ActionError,
    ) -> ActionError {
        error
    }

    fn handled_exit_action_exception(
        &self,
        machine: &str,
        state: &S,
        context: &TransitionContext<S, E, A>,
        error: &ActionError,
    ) {
    }

    fn handling_transition_exception(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        context: &TransitionContext<S, E, A>,
        error: ActionError,
    ) -> ActionError {
        error
    }

    fn handled_transition_exception(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        context: &TransitionContext<S, E, A>,
        error: &ActionError,
    ) {
    }

    /// State, history and queued events were restored from a loader.
    fn loaded(
        &self,
        machine: &str,
        current_state: Option<&S>,
        history: &HistoryStates<S>,
        events: &[EventInformation<E, A>],
        priority_events: &[EventInformation<E, A>],
    ) {
    }
}

/// Ordered list of registered extensions.
pub(crate) struct ExtensionHost<S: StateId, E: EventId, A: EventArgument> {
    extensions: RwLock<Vec<Arc<dyn Extension<S, E, A>>>>,
}

impl<S: StateId, E: EventId, A: EventArgument> ExtensionHost<S, E, A> {
    pub(crate) fn new() -> Self {
        Self {
            extensions: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, extension: Arc<dyn Extension<S, E, A>>) {
        self.extensions.write().push(extension);
    }

    pub(crate) fn clear(&self) {
        self.extensions.write().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.extensions.read().len()
    }

    /// Hooks run on a snapshot, so an extension may add or clear extensions.
    fn snapshot(&self) -> Vec<Arc<dyn Extension<S, E, A>>> {
        self.extensions.read().clone()
    }

    pub(crate) fn for_each<F>(&self, mut hook: F)
    where
        F: FnMut(&dyn Extension<S, E, A>),
    {
        for extension in self.snapshot() {
            hook(extension.as_ref());
        }
    }

    /// Thread `value` through every extension in registration order.
    pub(crate) fn fold<T, F>(&self, value: T, mut hook: F) -> T
    where
        F: FnMut(&dyn Extension<S, E, A>, T) -> T,
    {
        let extensions = self.snapshot();
        extensions
            .iter()
            .fold(value, |value, extension| hook(extension.as_ref(), value))
    }
}

//! Extension writing every lifecycle event to `tracing`.

use crate::core::{
    ActionError, EventArgument, EventId, EventInformation, HistoryStates, StateId,
    TransitionDefinition,
};
use crate::engine::TransitionContext;
use crate::extension::Extension;
use tracing::{debug, info, trace, warn};

/// Logs the lifecycle of a state machine through `tracing`.
///
/// Transitions are logged at `debug`, queueing and state entries at `trace`,
/// and every guard or action failure at `warn`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingExtension;

impl LoggingExtension {
    pub fn new() -> Self {
        Self
    }
}

impl<S: StateId, E: EventId, A: EventArgument> Extension<S, E, A> for LoggingExtension {
    fn started(&self, machine: &str) {
        info!(machine, "State machine started");
    }

    fn stopped(&self, machine: &str) {
        info!(machine, "State machine stopped");
    }

    fn event_queued(&self, machine: &str, event: &EventInformation<E, A>) {
        trace!(machine, event = ?event.event, argument = ?event.argument, "Event queued");
    }

    fn event_queued_with_priority(&self, machine: &str, event: &EventInformation<E, A>) {
        trace!(machine, event = ?event.event, argument = ?event.argument, "Event queued with priority");
    }

    fn entering_initial_state(&self, machine: &str, state: &S) {
        debug!(machine, ?state, "Entering initial state");
    }

    fn entered_initial_state(&self, machine: &str, state: &S, context: &TransitionContext<S, E, A>) {
        debug!(machine, ?state, records = %context.records_summary(), "Entered initial state");
    }

    fn firing_event(&self, machine: &str, event: EventInformation<E, A>) -> EventInformation<E, A> {
        debug!(machine, event = ?event.event, argument = ?event.argument, "Firing event");
        event
    }

    fn fired_event(&self, machine: &str, context: &TransitionContext<S, E, A>) {
        debug!(
            machine,
            state = ?context.state(),
            event = ?context.event(),
            records = %context.records_summary(),
            "Fired event"
        );
    }

    fn switched_state(&self, machine: &str, old_state: Option<&S>, new_state: &S) {
        debug!(machine, ?old_state, ?new_state, "Switched state");
    }

    fn entering_state(&self, machine: &str, state: &S, _context: &TransitionContext<S, E, A>) {
        trace!(machine, ?state, "Entering state");
    }

    fn skipped_transition(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        _context: &TransitionContext<S, E, A>,
    ) {
        trace!(machine, source = ?transition.source(), target = ?transition.target(), "Skipped transition");
    }

    fn executing_transition(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        _context: &TransitionContext<S, E, A>,
    ) {
        debug!(machine, source = ?transition.source(), target = ?transition.target(), "Executing transition");
    }

    fn executed_transition(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        context: &TransitionContext<S, E, A>,
    ) {
        debug!(
            machine,
            source = ?transition.source(),
            target = ?transition.target(),
            records = %context.records_summary(),
            "Executed transition"
        );
    }

    fn handled_guard_exception(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        _context: &TransitionContext<S, E, A>,
        error: &ActionError,
    ) {
        warn!(machine, source = ?transition.source(), %error, "Guard failed");
    }

    fn handled_entry_action_exception(
        &self,
        machine: &str,
        state: &S,
        _context: &TransitionContext<S, E, A>,
        error: &ActionError,
    ) {
        warn!(machine, ?state, %error, "Entry action failed");
    }

    fn handled_exit_action_exception(
        &self,
        machine: &str,
        state: &S,
        _context: &TransitionContext<S, E, A>,
        error: &ActionError,
    ) {
        warn!(machine, ?state, %error, "Exit action failed");
    }

    fn handled_transition_exception(
        &self,
        machine: &str,
        transition: &TransitionDefinition<S, E, A>,
        _context: &TransitionContext<S, E, A>,
        error: &ActionError,
    ) {
        warn!(machine, source = ?transition.source(), target = ?transition.target(), %error, "Transition action failed");
    }

    fn loaded(
        &self,
        machine: &str,
        current_state: Option<&S>,
        history: &HistoryStates<S>,
        events: &[EventInformation<E, A>],
        priority_events: &[EventInformation<E, A>],
    ) {
        info!(
            machine,
            ?current_state,
            history_states = history.len(),
            events = events.len(),
            priority_events = priority_events.len(),
            "State machine loaded"
        );
    }
}

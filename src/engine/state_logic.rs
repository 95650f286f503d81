//! Per-state algorithms: event bubbling, entry, exit and history re-entry.

use crate::core::{
    ActionError, EventArgument, EventId, HistoryType, StateDefinition, StateDefinitionDictionary,
    StateId,
};
use crate::engine::container::StateContainer;
use crate::engine::context::{RecordKind, TransitionContext, TransitionResult};
use crate::engine::error::StateMachineError;
use crate::engine::notifier::Notifier;
use crate::engine::transition_logic::TransitionLogic;
use tracing::trace;

type Definition<S, E, A> = StateDefinition<S, E, A>;

/// Borrowed view of one machine used while resolving a single event.
pub(crate) struct StateLogic<'a, S: StateId, E: EventId, A: EventArgument> {
    pub(crate) dictionary: &'a StateDefinitionDictionary<S, E, A>,
    pub(crate) container: &'a StateContainer<S, E, A>,
    pub(crate) notifier: &'a Notifier<S, E, A>,
}

impl<S: StateId, E: EventId, A: EventArgument> Clone for StateLogic<'_, S, E, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: StateId, E: EventId, A: EventArgument> Copy for StateLogic<'_, S, E, A> {}

impl<'a, S: StateId, E: EventId, A: EventArgument> StateLogic<'a, S, E, A> {
    pub(crate) fn definition(&self, state: &S) -> Result<&'a Definition<S, E, A>, StateMachineError> {
        self.dictionary
            .get(state)
            .ok_or_else(|| StateMachineError::unknown_state(state))
    }

    pub(crate) fn super_state_of(
        &self,
        definition: &Definition<S, E, A>,
    ) -> Result<&'a Definition<S, E, A>, StateMachineError> {
        match definition.super_state() {
            Some(parent) => self.definition(parent),
            None => Err(StateMachineError::unknown_state(definition.id())),
        }
    }

    /// Fire the context's event at `state`, bubbling up to super-states until
    /// a transition fires. Transitions of a sub-state shadow those of its
    /// super-states for the same event.
    pub(crate) fn fire(
        &self,
        state: &S,
        context: &mut TransitionContext<S, E, A>,
    ) -> Result<TransitionResult<S>, StateMachineError> {
        let Some(event) = context.event().cloned() else {
            return Ok(TransitionResult::NotFired);
        };
        let transitions = TransitionLogic::new(*self);

        let mut current = Some(self.definition(state)?);
        while let Some(definition) = current {
            for transition in definition.transitions_for(&event) {
                if let TransitionResult::Fired(new_state) =
                    transitions.fire(transition, state, context)?
                {
                    return Ok(TransitionResult::Fired(new_state));
                }
            }
            current = match definition.super_state() {
                Some(parent) => Some(self.definition(parent)?),
                None => None,
            };
        }

        Ok(TransitionResult::NotFired)
    }

    pub(crate) fn entry(
        &self,
        definition: &Definition<S, E, A>,
        context: &mut TransitionContext<S, E, A>,
    ) -> Result<(), StateMachineError> {
        trace!(machine = self.container.name(), state = ?definition.id(), "Entering state");
        context.add_record(definition.id().clone(), RecordKind::Enter);

        let name = self.container.name();
        self.container
            .extensions()
            .for_each(|extension| extension.entering_state(name, definition.id(), context));

        for action in definition.entry_actions() {
            if let Err(error) = action.execute(context.argument()) {
                self.handle_entry_action_exception(definition, context, error)?;
            }
        }
        Ok(())
    }

    /// Exit a state. The exiting state always becomes the last active
    /// sub-state of its super-state, whatever the super-state's history type.
    pub(crate) fn exit(
        &self,
        definition: &Definition<S, E, A>,
        context: &mut TransitionContext<S, E, A>,
    ) -> Result<(), StateMachineError> {
        trace!(machine = self.container.name(), state = ?definition.id(), "Exiting state");
        context.add_record(definition.id().clone(), RecordKind::Exit);

        for action in definition.exit_actions() {
            if let Err(error) = action.execute(context.argument()) {
                self.handle_exit_action_exception(definition, context, error)?;
            }
        }

        if let Some(parent) = definition.super_state() {
            self.container
                .set_last_active(parent.clone(), definition.id().clone());
        }
        Ok(())
    }

    /// Descend from an already entered state to the leaf its history policy
    /// selects, entering every state on the way. Returns the leaf.
    pub(crate) fn enter_by_history(
        &self,
        definition: &Definition<S, E, A>,
        context: &mut TransitionContext<S, E, A>,
    ) -> Result<S, StateMachineError> {
        match definition.history_type() {
            HistoryType::None => self.enter_history_none(definition, context),
            HistoryType::Shallow => match self.container.last_active(definition.id()) {
                Some(last_active) => self.enter_shallow(self.definition(&last_active)?, context),
                None => self.enter_history_none(definition, context),
            },
            HistoryType::Deep => match self.container.last_active(definition.id()) {
                Some(last_active) => self.enter_deep(self.definition(&last_active)?, context),
                None => self.enter_history_none(definition, context),
            },
        }
    }

    fn enter_history_none(
        &self,
        definition: &Definition<S, E, A>,
        context: &mut TransitionContext<S, E, A>,
    ) -> Result<S, StateMachineError> {
        match definition.initial_sub_state() {
            Some(initial) => self.enter_shallow(self.definition(initial)?, context),
            None => Ok(definition.id().clone()),
        }
    }

    fn enter_shallow(
        &self,
        definition: &Definition<S, E, A>,
        context: &mut TransitionContext<S, E, A>,
    ) -> Result<S, StateMachineError> {
        self.entry(definition, context)?;
        self.enter_history_none(definition, context)
    }

    fn enter_deep(
        &self,
        definition: &Definition<S, E, A>,
        context: &mut TransitionContext<S, E, A>,
    ) -> Result<S, StateMachineError> {
        self.entry(definition, context)?;
        match self.container.last_active(definition.id()) {
            Some(last_active) => self.enter_deep(self.definition(&last_active)?, context),
            None => self.enter_history_none(definition, context),
        }
    }

    fn handle_entry_action_exception(
        &self,
        definition: &Definition<S, E, A>,
        context: &TransitionContext<S, E, A>,
        error: ActionError,
    ) -> Result<(), StateMachineError> {
        let name = self.container.name();
        let extensions = self.container.extensions();
        let error = extensions.fold(error, |extension, error| {
            extension.handling_entry_action_exception(name, definition.id(), context, error)
        });
        self.notifier.exception_thrown(context, &error)?;
        extensions.for_each(|extension| {
            extension.handled_entry_action_exception(name, definition.id(), context, &error)
        });
        Ok(())
    }

    fn handle_exit_action_exception(
        &self,
        definition: &Definition<S, E, A>,
        context: &TransitionContext<S, E, A>,
        error: ActionError,
    ) -> Result<(), StateMachineError> {
        let name = self.container.name();
        let extensions = self.container.extensions();
        let error = extensions.fold(error, |extension, error| {
            extension.handling_exit_action_exception(name, definition.id(), context, error)
        });
        self.notifier.exception_thrown(context, &error)?;
        extensions.for_each(|extension| {
            extension.handled_exit_action_exception(name, definition.id(), context, &error)
        });
        Ok(())
    }
}

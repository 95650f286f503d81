//! Per-transition algorithms: guard evaluation, exit/entry traversal
//! bounded by the least common ancestor, and transition actions.

use crate::core::{
    ActionError, EventArgument, EventId, StateDefinition, StateId, TransitionDefinition,
};
use crate::engine::context::{TransitionContext, TransitionResult};
use crate::engine::error::StateMachineError;
use crate::engine::state_logic::StateLogic;
use tracing::trace;

type Definition<S, E, A> = StateDefinition<S, E, A>;
type Transition<S, E, A> = TransitionDefinition<S, E, A>;

pub(crate) struct TransitionLogic<'a, S: StateId, E: EventId, A: EventArgument> {
    states: StateLogic<'a, S, E, A>,
}

impl<'a, S: StateId, E: EventId, A: EventArgument> TransitionLogic<'a, S, E, A> {
    pub(crate) fn new(states: StateLogic<'a, S, E, A>) -> Self {
        Self { states }
    }

    /// Try one candidate transition. `leaf` is the active state, which may
    /// lie below the transition's source when the event bubbled up.
    pub(crate) fn fire(
        &self,
        transition: &Transition<S, E, A>,
        leaf: &S,
        context: &mut TransitionContext<S, E, A>,
    ) -> Result<TransitionResult<S>, StateMachineError> {
        let name = self.states.container.name();
        let extensions = self.states.container.extensions();

        if !self.should_fire(transition, context)? {
            extensions
                .for_each(|extension| extension.skipped_transition(name, transition, context));
            return Ok(TransitionResult::NotFired);
        }

        self.states.notifier.transition_begin(context);
        extensions.for_each(|extension| extension.executing_transition(name, transition, context));

        let new_state = match transition.target() {
            None => {
                self.perform_actions(transition, context)?;
                leaf.clone()
            }
            Some(target) => {
                self.unwind_sub_states(transition, leaf, context)?;
                let source = self.states.definition(transition.source())?;
                let target = self.states.definition(target)?;
                self.traverse(transition, source, target, context)?;
                self.states.enter_by_history(target, context)?
            }
        };

        extensions.for_each(|extension| extension.executed_transition(name, transition, context));
        Ok(TransitionResult::Fired(new_state))
    }

    fn should_fire(
        &self,
        transition: &Transition<S, E, A>,
        context: &TransitionContext<S, E, A>,
    ) -> Result<bool, StateMachineError> {
        let Some(guard) = transition.guard() else {
            return Ok(true);
        };
        match guard.check(context.argument()) {
            Ok(matched) => Ok(matched),
            Err(error) => {
                self.handle_guard_exception(transition, context, error)?;
                Ok(false)
            }
        }
    }

    /// Exit from the active leaf up to, excluding, the transition's source.
    fn unwind_sub_states(
        &self,
        transition: &Transition<S, E, A>,
        leaf: &S,
        context: &mut TransitionContext<S, E, A>,
    ) -> Result<(), StateMachineError> {
        let mut current = self.states.definition(leaf)?;
        while current.id() != transition.source() {
            self.states.exit(current, context)?;
            current = self.states.super_state_of(current)?;
        }
        Ok(())
    }

    /// Walk source and target towards their least common ancestor, exiting
    /// on the way up and entering on the way back down. A self transition,
    /// and a transition to an ancestor of the source, exit and re-enter the
    /// target.
    fn traverse(
        &self,
        transition: &Transition<S, E, A>,
        source: &Definition<S, E, A>,
        target: &Definition<S, E, A>,
        context: &mut TransitionContext<S, E, A>,
    ) -> Result<(), StateMachineError> {
        if Some(source.id()) == transition.target() {
            self.states.exit(source, context)?;
            self.perform_actions(transition, context)?;
            return self.states.entry(source, context);
        }

        if source.id() == target.id() {
            return self.perform_actions(transition, context);
        }

        if source.super_state() == target.super_state() {
            self.states.exit(source, context)?;
            self.perform_actions(transition, context)?;
            return self.states.entry(target, context);
        }

        let source_level = self.states.dictionary.level(source.id());
        let target_level = self.states.dictionary.level(target.id());
        trace!(
            source = ?source.id(),
            source_level,
            target = ?target.id(),
            target_level,
            "Traversing towards common ancestor"
        );

        if source_level > target_level {
            self.states.exit(source, context)?;
            self.traverse(
                transition,
                self.states.super_state_of(source)?,
                target,
                context,
            )
        } else if source_level < target_level {
            self.traverse(
                transition,
                source,
                self.states.super_state_of(target)?,
                context,
            )?;
            self.states.entry(target, context)
        } else {
            self.states.exit(source, context)?;
            self.traverse(
                transition,
                self.states.super_state_of(source)?,
                self.states.super_state_of(target)?,
                context,
            )?;
            self.states.entry(target, context)
        }
    }

    /// Run every action; a failing action does not stop its siblings.
    fn perform_actions(
        &self,
        transition: &Transition<S, E, A>,
        context: &TransitionContext<S, E, A>,
    ) -> Result<(), StateMachineError> {
        for action in transition.actions() {
            if let Err(error) = action.execute(context.argument()) {
                self.handle_transition_exception(transition, context, error)?;
            }
        }
        Ok(())
    }

    fn handle_guard_exception(
        &self,
        transition: &Transition<S, E, A>,
        context: &TransitionContext<S, E, A>,
        error: ActionError,
    ) -> Result<(), StateMachineError> {
        let name = self.states.container.name();
        let extensions = self.states.container.extensions();
        let error = extensions.fold(error, |extension, error| {
            extension.handling_guard_exception(name, transition, context, error)
        });
        self.states.notifier.exception_thrown(context, &error)?;
        extensions.for_each(|extension| {
            extension.handled_guard_exception(name, transition, context, &error)
        });
        Ok(())
    }

    fn handle_transition_exception(
        &self,
        transition: &Transition<S, E, A>,
        context: &TransitionContext<S, E, A>,
        error: ActionError,
    ) -> Result<(), StateMachineError> {
        let name = self.states.container.name();
        let extensions = self.states.container.extensions();
        let error = extensions.fold(error, |extension, error| {
            extension.handling_transition_exception(name, transition, context, error)
        });
        self.states.notifier.exception_thrown(context, &error)?;
        extensions.for_each(|extension| {
            extension.handled_transition_exception(name, transition, context, &error)
        });
        Ok(())
    }
}

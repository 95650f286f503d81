//! The state machine orchestrator shared by every executor.

use crate::checkpoint::{StateMachineLoader, StateMachineSaver};
use crate::core::{
    EventArgument, EventId, EventInformation, HistoryStates, MachineDefinition,
    StateDefinitionDictionary, StateId,
};
use crate::engine::container::{Initialization, StateContainer};
use crate::engine::context::{TransitionContext, TransitionResult};
use crate::engine::error::StateMachineError;
use crate::engine::notifier::{
    Notifier, TransitionCompletedEventArgs, TransitionEventArgs, TransitionExceptionEventArgs,
};
use crate::engine::state_logic::StateLogic;
use crate::extension::{Extension, ExtensionHost};
use crate::report::StateMachineReport;
use std::sync::Arc;
use tracing::debug;

/// Events restored by a load, to be queued by the executor.
#[derive(Clone, Debug, Default)]
pub struct PendingEvents<E, A> {
    pub events: Vec<EventInformation<E, A>>,
    pub priority_events: Vec<EventInformation<E, A>>,
}

/// Synchronous resolution core: resolves one event at a time.
///
/// It does not queue anything; executors own the queues and decide on which
/// thread [`StateMachine::fire`] runs. Calls must be serialized by the caller,
/// which every executor guarantees.
pub struct StateMachine<S: StateId, E: EventId, A: EventArgument> {
    dictionary: Arc<StateDefinitionDictionary<S, E, A>>,
    initial_state: S,
    container: StateContainer<S, E, A>,
    notifier: Notifier<S, E, A>,
}

impl<S: StateId, E: EventId, A: EventArgument> StateMachine<S, E, A> {
    pub fn new(name: impl Into<String>, definition: MachineDefinition<S, E, A>) -> Self {
        Self {
            dictionary: definition.dictionary,
            initial_state: definition.initial_state,
            container: StateContainer::new(name, definition.initially_last_active_states),
            notifier: Notifier::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.container.name()
    }

    pub fn dictionary(&self) -> &StateDefinitionDictionary<S, E, A> {
        &self.dictionary
    }

    pub fn initial_state(&self) -> &S {
        &self.initial_state
    }

    /// The active leaf state, `None` until the initial state was entered or
    /// a state was loaded.
    pub fn current_state(&self) -> Option<S> {
        self.container.current_state()
    }

    pub fn history(&self) -> HistoryStates<S> {
        self.container.history()
    }

    /// Whether `initialize()` was called or a current state was loaded.
    pub fn is_initialized(&self) -> bool {
        self.container.is_initialized()
    }

    /// Mark the machine for initialization. The initial state is entered
    /// lazily by [`StateMachine::enter_initial_state_if_pending`].
    pub fn initialize(&self) -> Result<(), StateMachineError> {
        debug!(machine = self.name(), initial_state = ?self.initial_state, "Initializing state machine");
        self.container.initialize()
    }

    /// Enter the initial state if `initialize()` is still pending. Succeeds
    /// at most once per machine; a failed entry stays pending and is retried
    /// by the next call.
    pub fn enter_initial_state_if_pending(&self) -> Result<(), StateMachineError> {
        if self.container.take_pending_initialization() {
            if let Err(error) = self.enter_initial_state() {
                self.container.release_pending_initialization();
                return Err(error);
            }
        }
        Ok(())
    }

    /// Enter every state from the root down to the initial state, then
    /// descend according to the initial state's history policy.
    pub fn enter_initial_state(&self) -> Result<(), StateMachineError> {
        let name = self.name();
        let extensions = self.container.extensions();
        let logic = self.state_logic();
        let initial = logic.definition(&self.initial_state)?;

        extensions.for_each(|extension| extension.entering_initial_state(name, &self.initial_state));

        let mut context = TransitionContext::for_initial_state();
        for definition in self.dictionary.path_to_root(&self.initial_state).into_iter().rev() {
            logic.entry(definition, &mut context)?;
        }
        let leaf = logic.enter_by_history(initial, &mut context)?;
        self.switch_state_to(leaf);

        extensions.for_each(|extension| {
            extension.entered_initial_state(name, &self.initial_state, &context)
        });
        Ok(())
    }

    /// Resolve one event against the current state.
    ///
    /// Failures of guards and actions are reported through extensions and
    /// the exception notification; only when no exception listener is
    /// registered does the failure come back as
    /// [`StateMachineError::UnhandledTransitionException`].
    pub fn fire(&self, event: E, argument: Option<A>) -> Result<(), StateMachineError> {
        let current = match self.container.initialization() {
            Initialization::Uninitialized => return Err(StateMachineError::NotInitialized),
            Initialization::Pending => return Err(StateMachineError::InitialStateNotEntered),
            Initialization::Entered => self
                .container
                .current_state()
                .ok_or(StateMachineError::InitialStateNotEntered)?,
        };

        let name = self.name();
        let extensions = self.container.extensions();
        let EventInformation { event, argument } = extensions.fold(
            EventInformation::new(event, argument),
            |extension, event| extension.firing_event(name, event),
        );
        debug!(machine = name, state = ?current, ?event, "Firing event");

        let mut context = TransitionContext::for_event(current.clone(), event, argument);
        match self.state_logic().fire(&current, &mut context)? {
            TransitionResult::NotFired => {
                debug!(machine = name, state = ?current, event = ?context.event(), "Transition declined");
                self.notifier.transition_declined(&context);
            }
            TransitionResult::Fired(new_state) => {
                self.switch_state_to(new_state.clone());
                extensions.for_each(|extension| extension.fired_event(name, &context));
                self.notifier.transition_completed(&context, &new_state);
            }
        }
        Ok(())
    }

    /// Persist current state and history. Queued events belong to the
    /// executor and are saved by it.
    pub fn save_state<W>(&self, saver: &mut W) -> Result<(), StateMachineError>
    where
        W: StateMachineSaver<S, E, A> + ?Sized,
    {
        saver.save_current_state(self.current_state().as_ref())?;
        saver.save_history_states(&self.history())?;
        Ok(())
    }

    /// Restore current state and history and read the pending events.
    ///
    /// Only legal before initialization. Every restored last-active state
    /// must be a direct sub-state of the super-state it is recorded for.
    pub fn load_state<L>(&self, loader: &mut L) -> Result<PendingEvents<E, A>, StateMachineError>
    where
        L: StateMachineLoader<S, E, A> + ?Sized,
    {
        if self.container.is_initialized() {
            return Err(StateMachineError::AlreadyInitialized);
        }

        let current_state = loader.load_current_state()?;
        if let Some(state) = &current_state {
            if !self.dictionary.contains(state) {
                return Err(StateMachineError::unknown_state(state));
            }
        }
        let history = loader.load_history_states()?;
        self.validate_history(&history)?;
        let pending = PendingEvents {
            events: loader.load_events()?,
            priority_events: loader.load_priority_events()?,
        };

        self.container.restore(current_state.clone(), history.clone())?;

        let name = self.name();
        self.container.extensions().for_each(|extension| {
            extension.loaded(
                name,
                current_state.as_ref(),
                &history,
                &pending.events,
                &pending.priority_events,
            )
        });
        debug!(
            machine = name,
            ?current_state,
            events = pending.events.len(),
            priority_events = pending.priority_events.len(),
            "State machine loaded"
        );
        Ok(pending)
    }

    fn validate_history(&self, history: &HistoryStates<S>) -> Result<(), StateMachineError> {
        for (super_state, last_active) in history.as_map() {
            let definition = self
                .dictionary
                .get(super_state)
                .ok_or_else(|| StateMachineError::unknown_state(super_state))?;
            if !self.dictionary.contains(last_active) {
                return Err(StateMachineError::unknown_state(last_active));
            }
            if !definition.has_sub_state(last_active) {
                return Err(StateMachineError::InvalidHistory {
                    super_state: format!("{super_state:?}"),
                    last_active: format!("{last_active:?}"),
                });
            }
        }
        Ok(())
    }

    pub fn report<R>(&self, generator: &R)
    where
        R: StateMachineReport<S, E, A> + ?Sized,
    {
        generator.report(self.name(), &self.dictionary, &self.initial_state);
    }

    pub fn add_extension(&self, extension: Arc<dyn Extension<S, E, A>>) {
        self.container.extensions().add(extension);
    }

    pub fn clear_extensions(&self) {
        self.container.extensions().clear();
    }

    pub fn extension_count(&self) -> usize {
        self.container.extensions().len()
    }

    pub fn on_transition_begin<F>(&self, listener: F)
    where
        F: Fn(&TransitionEventArgs<S, E, A>) + Send + Sync + 'static,
    {
        self.notifier.on_transition_begin(listener);
    }

    pub fn on_transition_completed<F>(&self, listener: F)
    where
        F: Fn(&TransitionCompletedEventArgs<S, E, A>) + Send + Sync + 'static,
    {
        self.notifier.on_transition_completed(listener);
    }

    pub fn on_transition_declined<F>(&self, listener: F)
    where
        F: Fn(&TransitionEventArgs<S, E, A>) + Send + Sync + 'static,
    {
        self.notifier.on_transition_declined(listener);
    }

    /// Registering any listener here keeps guard and action failures from
    /// escaping as errors.
    pub fn on_transition_exception<F>(&self, listener: F)
    where
        F: Fn(&TransitionExceptionEventArgs<S, E, A>) + Send + Sync + 'static,
    {
        self.notifier.on_transition_exception(listener);
    }

    pub(crate) fn extensions(&self) -> &ExtensionHost<S, E, A> {
        self.container.extensions()
    }

    fn state_logic(&self) -> StateLogic<'_, S, E, A> {
        StateLogic {
            dictionary: &self.dictionary,
            container: &self.container,
            notifier: &self.notifier,
        }
    }

    fn switch_state_to(&self, new_state: S) {
        let old_state = self.container.set_current_state(new_state.clone());
        debug!(machine = self.name(), ?old_state, ?new_state, "Switched state");
        let name = self.name();
        self.container.extensions().for_each(|extension| {
            extension.switched_state(name, old_state.as_ref(), &new_state)
        });
    }
}

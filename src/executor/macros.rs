//! Macros shared by the executors.

/// Generate the surface every executor shares with the orchestrator.
///
/// The executor must be a struct `$executor<S, E, A>` with an `inner` field
/// dereferencing to a value with `machine` and `queues` fields, and must
/// provide `fn enqueue(&self, EventInformation<E, A>, priority: bool)`.
macro_rules! executor_surface {
    ($executor:ident) => {
        impl<S, E, A> $executor<S, E, A>
        where
            S: $crate::core::StateId,
            E: $crate::core::EventId,
            A: $crate::core::EventArgument,
        {
            pub fn name(&self) -> &str {
                self.inner.machine.name()
            }

            pub fn current_state(&self) -> Option<S> {
                self.inner.machine.current_state()
            }

            pub fn history(&self) -> $crate::core::HistoryStates<S> {
                self.inner.machine.history()
            }

            pub fn is_initialized(&self) -> bool {
                self.inner.machine.is_initialized()
            }

            /// Mark the machine for initialization. The initial state is
            /// entered when the executor first processes events.
            pub fn initialize(&self) -> Result<(), $crate::engine::StateMachineError> {
                self.inner.machine.initialize()
            }

            pub fn fire(&self, event: E) -> Result<(), $crate::engine::StateMachineError> {
                self.enqueue($crate::core::EventInformation::new(event, None), false)
            }

            pub fn fire_with(
                &self,
                event: E,
                argument: A,
            ) -> Result<(), $crate::engine::StateMachineError> {
                self.enqueue($crate::core::EventInformation::new(event, Some(argument)), false)
            }

            /// Queue an event ahead of every normal event.
            pub fn fire_priority(&self, event: E) -> Result<(), $crate::engine::StateMachineError> {
                self.enqueue($crate::core::EventInformation::new(event, None), true)
            }

            pub fn fire_priority_with(
                &self,
                event: E,
                argument: A,
            ) -> Result<(), $crate::engine::StateMachineError> {
                self.enqueue($crate::core::EventInformation::new(event, Some(argument)), true)
            }

            /// Save current state, history and every event not processed yet.
            pub fn save<W>(&self, saver: &mut W) -> Result<(), $crate::engine::StateMachineError>
            where
                W: $crate::checkpoint::StateMachineSaver<S, E, A> + ?Sized,
            {
                self.inner.machine.save_state(saver)?;
                let (events, priority_events) = self.inner.queues.lock().snapshot();
                saver.save_events(&events)?;
                saver.save_priority_events(&priority_events)?;
                Ok(())
            }

            /// Restore a saved machine. Only legal before initialization.
            pub fn load<L>(&self, loader: &mut L) -> Result<(), $crate::engine::StateMachineError>
            where
                L: $crate::checkpoint::StateMachineLoader<S, E, A> + ?Sized,
            {
                let pending = self.inner.machine.load_state(loader)?;
                self.inner.queues.lock().restore(pending);
                Ok(())
            }

            pub fn add_extension(
                &self,
                extension: std::sync::Arc<dyn $crate::extension::Extension<S, E, A>>,
            ) {
                self.inner.machine.add_extension(extension);
            }

            pub fn clear_extensions(&self) {
                self.inner.machine.clear_extensions();
            }

            pub fn on_transition_begin<F>(&self, listener: F)
            where
                F: Fn(&$crate::engine::TransitionEventArgs<S, E, A>) + Send + Sync + 'static,
            {
                self.inner.machine.on_transition_begin(listener);
            }

            pub fn on_transition_completed<F>(&self, listener: F)
            where
                F: Fn(&$crate::engine::TransitionCompletedEventArgs<S, E, A>)
                    + Send
                    + Sync
                    + 'static,
            {
                self.inner.machine.on_transition_completed(listener);
            }

            pub fn on_transition_declined<F>(&self, listener: F)
            where
                F: Fn(&$crate::engine::TransitionEventArgs<S, E, A>) + Send + Sync + 'static,
            {
                self.inner.machine.on_transition_declined(listener);
            }

            /// Without an exception listener, a failing guard or action stops
            /// event processing with `UnhandledTransitionException`.
            pub fn on_transition_exception<F>(&self, listener: F)
            where
                F: Fn(&$crate::engine::TransitionExceptionEventArgs<S, E, A>)
                    + Send
                    + Sync
                    + 'static,
            {
                self.inner.machine.on_transition_exception(listener);
            }

            pub fn report<R>(&self, generator: &R)
            where
                R: $crate::report::StateMachineReport<S, E, A> + ?Sized,
            {
                self.inner.machine.report(generator);
            }
        }

        impl<S, E, A> Clone for $executor<S, E, A>
        where
            S: $crate::core::StateId,
            E: $crate::core::EventId,
            A: $crate::core::EventArgument,
        {
            fn clone(&self) -> Self {
                Self {
                    inner: std::sync::Arc::clone(&self.inner),
                }
            }
        }
    };
}

pub(crate) use executor_surface;

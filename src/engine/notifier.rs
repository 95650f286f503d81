//! Transition notifications for the embedding application.

use crate::core::{ActionError, EventArgument, EventId, StateId};
use crate::engine::context::TransitionContext;
use crate::engine::error::StateMachineError;
use parking_lot::RwLock;
use std::sync::Arc;

/// Data carried by every transition notification.
#[derive(Clone, Debug)]
pub struct TransitionEventArgs<S, E, A> {
    /// Active state when the event was fired; `None` during initial entry.
    pub state: Option<S>,
    pub event: Option<E>,
    pub argument: Option<A>,
}

/// Sent after a transition completed.
#[derive(Clone, Debug)]
pub struct TransitionCompletedEventArgs<S, E, A> {
    pub transition: TransitionEventArgs<S, E, A>,
    pub new_state: S,
}

/// Sent when a guard or action failed.
#[derive(Clone, Debug)]
pub struct TransitionExceptionEventArgs<S, E, A> {
    pub transition: TransitionEventArgs<S, E, A>,
    pub error: ActionError,
}

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listeners<T>(RwLock<Vec<Listener<T>>>);

impl<T> Listeners<T> {
    fn new() -> Self {
        Self(RwLock::new(Vec::new()))
    }

    fn add(&self, listener: Listener<T>) {
        self.0.write().push(listener);
    }

    fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Listeners run on a snapshot so they may register further listeners.
    fn notify(&self, args: &T) {
        let listeners = self.0.read().clone();
        for listener in listeners {
            listener(args);
        }
    }
}

/// Registry of the four transition notifications.
pub(crate) struct Notifier<S, E, A> {
    begin: Listeners<TransitionEventArgs<S, E, A>>,
    completed: Listeners<TransitionCompletedEventArgs<S, E, A>>,
    declined: Listeners<TransitionEventArgs<S, E, A>>,
    exception: Listeners<TransitionExceptionEventArgs<S, E, A>>,
}

impl<S: StateId, E: EventId, A: EventArgument> Notifier<S, E, A> {
    pub(crate) fn new() -> Self {
        Self {
            begin: Listeners::new(),
            completed: Listeners::new(),
            declined: Listeners::new(),
            exception: Listeners::new(),
        }
    }

    pub(crate) fn on_transition_begin<F>(&self, listener: F)
    where
        F: Fn(&TransitionEventArgs<S, E, A>) + Send + Sync + 'static,
    {
        self.begin.add(Arc::new(listener));
    }

    pub(crate) fn on_transition_completed<F>(&self, listener: F)
    where
        F: Fn(&TransitionCompletedEventArgs<S, E, A>) + Send + Sync + 'static,
    {
        self.completed.add(Arc::new(listener));
    }

    pub(crate) fn on_transition_declined<F>(&self, listener: F)
    where
        F: Fn(&TransitionEventArgs<S, E, A>) + Send + Sync + 'static,
    {
        self.declined.add(Arc::new(listener));
    }

    pub(crate) fn on_transition_exception<F>(&self, listener: F)
    where
        F: Fn(&TransitionExceptionEventArgs<S, E, A>) + Send + Sync + 'static,
    {
        self.exception.add(Arc::new(listener));
    }

    pub(crate) fn transition_begin(&self, context: &TransitionContext<S, E, A>) {
        self.begin.notify(&Self::args(context));
    }

    pub(crate) fn transition_completed(&self, context: &TransitionContext<S, E, A>, new_state: &S) {
        self.completed.notify(&TransitionCompletedEventArgs {
            transition: Self::args(context),
            new_state: new_state.clone(),
        });
    }

    pub(crate) fn transition_declined(&self, context: &TransitionContext<S, E, A>) {
        self.declined.notify(&Self::args(context));
    }

    /// Report a failure. Without any exception listener the failure becomes
    /// fatal and is returned to the caller.
    pub(crate) fn exception_thrown(
        &self,
        context: &TransitionContext<S, E, A>,
        error: &ActionError,
    ) -> Result<(), StateMachineError> {
        if self.exception.is_empty() {
            return Err(StateMachineError::UnhandledTransitionException(
                error.clone(),
            ));
        }
        self.exception.notify(&TransitionExceptionEventArgs {
            transition: Self::args(context),
            error: error.clone(),
        });
        Ok(())
    }

    fn args(context: &TransitionContext<S, E, A>) -> TransitionEventArgs<S, E, A> {
        TransitionEventArgs {
            state: context.state().cloned(),
            event: context.event().cloned(),
            argument: context.argument().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type TestNotifier = Notifier<&'static str, &'static str, ()>;

    #[test]
    fn exception_without_listener_is_fatal() {
        let notifier = TestNotifier::new();
        let context = TransitionContext::for_event("A", "Go", None);

        let result = notifier.exception_thrown(&context, &ActionError::msg("boom"));

        assert!(matches!(
            result,
            Err(StateMachineError::UnhandledTransitionException(_))
        ));
    }

    #[test]
    fn exception_with_listener_is_reported() {
        let notifier = TestNotifier::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        notifier.on_transition_exception(move |args| {
            assert_eq!(args.error.to_string(), "boom");
            assert_eq!(args.transition.state, Some("A"));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let context = TransitionContext::for_event("A", "Go", None);

        notifier
            .exception_thrown(&context, &ActionError::msg("boom"))
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn completed_carries_new_state() {
        let notifier = TestNotifier::new();
        let new_states = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&new_states);
        notifier.on_transition_completed(move |args| sink.lock().push(args.new_state));
        let context = TransitionContext::for_event("A", "Go", None);

        notifier.transition_completed(&context, &"B");

        assert_eq!(*new_states.lock(), vec!["B"]);
    }
}

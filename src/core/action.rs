//! Entry, exit and transition actions.

use crate::core::error::ActionError;
use std::fmt;
use std::sync::Arc;

type ActionFn<A> = dyn Fn(Option<&A>) -> Result<(), ActionError> + Send + Sync;

/// Side effect run when a state is entered or exited, or when a transition
/// executes. Receives the argument of the event being processed, if any.
pub struct Action<A> {
    run: Arc<ActionFn<A>>,
    description: Option<String>,
}

impl<A> Action<A> {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(Option<&A>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Action {
            run: Arc::new(action),
            description: None,
        }
    }

    /// Action that ignores the argument and cannot fail.
    pub fn from_fn<F>(action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::new(move |_| {
            action();
            Ok(())
        })
    }

    /// Action that requires an argument; missing arguments fail with
    /// [`ActionError::MissingArgument`].
    pub fn with_argument<F>(action: F) -> Self
    where
        F: Fn(&A) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Self::new(move |argument| match argument {
            Some(argument) => action(argument),
            None => Err(ActionError::MissingArgument),
        })
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn execute(&self, argument: Option<&A>) -> Result<(), ActionError> {
        (self.run)(argument)
    }
}

impl<A> Clone for Action<A> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
            description: self.description.clone(),
        }
    }
}

impl<A> fmt::Debug for Action<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("description", &self.description)
            .finish()
    }
}

//! Errors raised by user code and by definition validation.

use std::sync::Arc;
use thiserror::Error;

/// Failure raised by a guard, entry action, exit action or transition action.
///
/// These never abort event processing on their own. They are routed through
/// the extension hooks and the transition-exception notification.
#[derive(Debug, Clone, Error)]
pub enum ActionError {
    #[error("{0}")]
    Failed(String),

    #[error("Event argument is missing")]
    MissingArgument,

    #[error("Event argument has an unexpected value; expected {expected}")]
    ArgumentMismatch { expected: &'static str },

    #[error(transparent)]
    Source(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActionError {
    /// Create a failure carrying a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        ActionError::Failed(message.into())
    }

    /// Wrap an arbitrary error raised by user code.
    pub fn source<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ActionError::Source(Arc::new(error))
    }
}

/// A structural problem found while validating a machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Initial state {state} is not defined")]
    UnknownInitialState { state: String },

    #[error("State {state} already has super-state {existing}; cannot re-parent it to {requested}")]
    SuperStateAlreadySet {
        state: String,
        existing: String,
        requested: String,
    },

    #[error("State {state} cannot be its own super-state")]
    SelfSuperState { state: String },

    #[error("State hierarchy contains a cycle through {state}")]
    CyclicHierarchy { state: String },

    #[error("Initial sub-state {initial} is not a sub-state of {state}")]
    InitialStateNotSubState { state: String, initial: String },

    #[error("Only one unconditional transition is allowed for event {event} on state {state}")]
    MultipleUnconditionalTransitions { state: String, event: String },

    #[error("The unconditional transition for event {event} on state {state} must be declared last")]
    UnconditionalTransitionNotLast { state: String, event: String },
}

//! Errors surfaced by the state machine at its public API.

use crate::checkpoint::CheckpointError;
use crate::core::ActionError;
use thiserror::Error;

/// Errors returned by state machine operations.
#[derive(Debug, Error)]
pub enum StateMachineError {
    #[error("The state machine is not initialized. Call initialize() or load() first")]
    NotInitialized,

    #[error("The state machine is already initialized")]
    AlreadyInitialized,

    #[error("The state machine has not entered its initial state yet")]
    InitialStateNotEntered,

    #[error("State {0} is not part of the state machine definition")]
    UnknownState(String),

    #[error("Cannot restore history: {last_active} is not a sub-state of {super_state}")]
    InvalidHistory {
        super_state: String,
        last_active: String,
    },

    /// A guard or action failed and nobody listens for transition exceptions.
    #[error("Unhandled transition exception: {0}")]
    UnhandledTransitionException(ActionError),

    #[error("The async state machine must be started from within a Tokio runtime")]
    NoAsyncRuntime,

    #[error("The worker thread could not be spawned: {0}")]
    WorkerSpawnFailed(String),

    #[error("The worker panicked while processing events")]
    WorkerPanicked,

    #[error("The worker did not stop within the configured timeout")]
    StopTimedOut,

    #[error(transparent)]
    Persistence(#[from] CheckpointError),
}

impl StateMachineError {
    pub(crate) fn unknown_state<S: std::fmt::Debug>(state: &S) -> Self {
        StateMachineError::UnknownState(format!("{state:?}"))
    }
}

//! Mutable runtime state of one state machine instance.

use crate::core::{EventArgument, EventId, HistoryStates, StateId};
use crate::engine::error::StateMachineError;
use crate::extension::ExtensionHost;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Initialization lifecycle of a machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Initialization {
    Uninitialized,
    /// `initialize()` was called; the initial state is entered on the first drain.
    Pending,
    Entered,
}

struct Runtime<S: StateId> {
    current_state: Option<S>,
    initialization: Initialization,
    history: HistoryStates<S>,
}

/// Current state, history, extensions and name of a machine.
///
/// The lock only guards individual reads and writes. It is never held while
/// user code runs, so actions may call back into the machine.
pub(crate) struct StateContainer<S: StateId, E: EventId, A: EventArgument> {
    name: String,
    runtime: Mutex<Runtime<S>>,
    extensions: ExtensionHost<S, E, A>,
}

impl<S: StateId, E: EventId, A: EventArgument> StateContainer<S, E, A> {
    pub(crate) fn new(name: impl Into<String>, initially_last_active: HashMap<S, S>) -> Self {
        Self {
            name: name.into(),
            runtime: Mutex::new(Runtime {
                current_state: None,
                initialization: Initialization::Uninitialized,
                history: HistoryStates::from_map(initially_last_active),
            }),
            extensions: ExtensionHost::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn extensions(&self) -> &ExtensionHost<S, E, A> {
        &self.extensions
    }

    pub(crate) fn current_state(&self) -> Option<S> {
        self.runtime.lock().current_state.clone()
    }

    /// Switch to `new_state`, returning the previous state.
    pub(crate) fn set_current_state(&self, new_state: S) -> Option<S> {
        self.runtime.lock().current_state.replace(new_state)
    }

    pub(crate) fn last_active(&self, super_state: &S) -> Option<S> {
        self.runtime.lock().history.last_active(super_state).cloned()
    }

    pub(crate) fn set_last_active(&self, super_state: S, sub_state: S) {
        self.runtime.lock().history.record(super_state, sub_state);
    }

    pub(crate) fn history(&self) -> HistoryStates<S> {
        self.runtime.lock().history.clone()
    }

    pub(crate) fn initialization(&self) -> Initialization {
        self.runtime.lock().initialization
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialization() != Initialization::Uninitialized
    }

    pub(crate) fn initialize(&self) -> Result<(), StateMachineError> {
        let mut runtime = self.runtime.lock();
        if runtime.initialization != Initialization::Uninitialized {
            return Err(StateMachineError::AlreadyInitialized);
        }
        runtime.initialization = Initialization::Pending;
        Ok(())
    }

    /// Claim a pending initialization. Returns `true` exactly once.
    pub(crate) fn take_pending_initialization(&self) -> bool {
        let mut runtime = self.runtime.lock();
        if runtime.initialization == Initialization::Pending {
            runtime.initialization = Initialization::Entered;
            true
        } else {
            false
        }
    }

    /// Hand a claimed initialization back after the initial entry failed.
    pub(crate) fn release_pending_initialization(&self) {
        let mut runtime = self.runtime.lock();
        if runtime.initialization == Initialization::Entered && runtime.current_state.is_none() {
            runtime.initialization = Initialization::Pending;
        }
    }

    /// Replace current state and history with restored values.
    ///
    /// A restored current state counts as an entered initial state.
    pub(crate) fn restore(
        &self,
        current_state: Option<S>,
        history: HistoryStates<S>,
    ) -> Result<(), StateMachineError> {
        let mut runtime = self.runtime.lock();
        if runtime.initialization != Initialization::Uninitialized {
            return Err(StateMachineError::AlreadyInitialized);
        }
        if current_state.is_some() {
            runtime.initialization = Initialization::Entered;
        }
        runtime.current_state = current_state;
        runtime.history = history;
        Ok(())
    }
}

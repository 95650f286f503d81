//! Core state machine model.
//!
//! This module contains the pure data the engine runs on:
//! - Identifier bounds for states, events and event arguments
//! - State and transition definitions held in an id-keyed arena
//! - Guards and actions supplied by the embedding application
//! - The last-active sub-state map used for history re-entry
//!
//! Nothing in here executes a transition; see [`crate::engine`].

mod action;
mod dictionary;
mod error;
mod guard;
mod history;
mod state;
mod transition;

pub use action::Action;
pub use dictionary::{MachineDefinition, StateDefinitionDictionary};
pub use error::{ActionError, DefinitionError};
pub use guard::Guard;
pub use history::{HistoryEntry, HistoryStates};
pub use state::{EventArgument, EventId, HistoryType, StateDefinition, StateId};
pub use transition::{EventInformation, TransitionDefinition};

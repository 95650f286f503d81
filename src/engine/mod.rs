//! Event resolution engine.
//!
//! [`StateMachine`] resolves one event at a time against the state hierarchy:
//! it bubbles the event from the active leaf to its super-states, evaluates
//! guards, exits and enters the states between source and target, and
//! re-enters compound states according to their history policy.
//!
//! Queueing and threading live in [`crate::executor`].

mod container;
mod context;
mod error;
mod machine;
mod notifier;
mod state_logic;
mod transition_logic;

pub use context::{Record, RecordKind, TransitionContext, TransitionResult};
pub use error::StateMachineError;
pub use machine::{PendingEvents, StateMachine};
pub use notifier::{TransitionCompletedEventArgs, TransitionEventArgs, TransitionExceptionEventArgs};

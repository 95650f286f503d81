//! Statetree: a hierarchical state machine engine
//!
//! States form a tree of super-states and sub-states. An event fired at the
//! active leaf bubbles up the tree until a state declares a transition whose
//! guard matches; the engine then exits the states between source and target,
//! runs the transition's actions and enters the target, descending into
//! compound states according to their history policy.
//!
//! # Core Concepts
//!
//! - **Definition**: states, hierarchy and transitions, built once with
//!   [`StateMachineBuilder`] into a shareable [`MachineDefinition`]
//! - **Executors**: [`PassiveStateMachine`] (calling thread),
//!   [`ActiveStateMachine`] (worker thread) and [`AsyncStateMachine`] (Tokio task)
//! - **Extensions**: observers of every lifecycle point that can substitute
//!   events and errors in flight
//! - **Persistence**: current state, history and queued events via [`Checkpoint`]
//!
//! # Example
//!
//! ```rust
//! use statetree::prelude::*;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Door {
//!     Closed,
//!     Open,
//! }
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Command {
//!     Push,
//!     Pull,
//! }
//!
//! let mut builder = StateMachineBuilder::<Door, Command>::new();
//! builder.in_state(Door::Closed).on(Command::Push).goto(Door::Open);
//! builder.in_state(Door::Open).on(Command::Pull).goto(Door::Closed);
//! builder.with_initial_state(Door::Closed);
//!
//! let machine = builder.build()?.create_passive_state_machine("door");
//! machine.initialize()?;
//! machine.start()?;
//! machine.fire(Command::Push)?;
//!
//! assert_eq!(machine.current_state(), Some(Door::Open));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod engine;
pub mod executor;
pub mod extension;
pub mod report;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use checkpoint::{Checkpoint, CheckpointError, StateMachineLoader, StateMachineSaver};
pub use core::{Action, ActionError, Guard, HistoryType, MachineDefinition};
pub use engine::{StateMachine, StateMachineError};
pub use executor::{ActiveConfig, ActiveStateMachine, AsyncStateMachine, PassiveStateMachine};
pub use extension::{Extension, LoggingExtension};

/// Everything needed to define and run a state machine.
pub mod prelude {
    pub use crate::builder::{BuildError, StateMachineBuilder};
    pub use crate::checkpoint::{Checkpoint, StateMachineLoader, StateMachineSaver};
    pub use crate::core::{
        Action, ActionError, EventInformation, Guard, HistoryType, MachineDefinition,
    };
    pub use crate::engine::{StateMachineError, TransitionContext};
    pub use crate::executor::{
        ActiveConfig, ActiveStateMachine, AsyncStateMachine, PassiveStateMachine,
    };
    pub use crate::extension::{Extension, LoggingExtension};
}

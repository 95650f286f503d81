//! Builder API for state machine definitions.
//!
//! The builders produce a [`MachineDefinition`](crate::core::MachineDefinition):
//! a validated, immutable state dictionary that any number of machines and
//! executors can share.

pub mod error;
pub mod hierarchy;
pub mod machine;
pub mod state;
pub mod transition;

pub use error::BuildError;
pub use hierarchy::HierarchyBuilder;
pub use machine::StateMachineBuilder;
pub use state::StateBuilder;
pub use transition::TransitionBuilder;

//! Build errors for state machine definitions.

use crate::core::DefinitionError;
use thiserror::Error;

/// Errors that can occur when building a machine definition.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .with_initial_state(state) before .build()")]
    MissingInitialState,

    /// Every problem found in the definition, not just the first one.
    #[error("Invalid state machine definition: {}", summarize(.0))]
    InvalidDefinition(Vec<DefinitionError>),
}

impl BuildError {
    /// The accumulated definition errors, empty for `MissingInitialState`.
    pub fn definition_errors(&self) -> &[DefinitionError] {
        match self {
            BuildError::InvalidDefinition(errors) => errors,
            BuildError::MissingInitialState => &[],
        }
    }
}

fn summarize(errors: &[DefinitionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

//! Builder for constructing validated machine definitions.

use crate::builder::error::BuildError;
use crate::builder::hierarchy::HierarchyBuilder;
use crate::builder::state::StateBuilder;
use crate::core::{
    DefinitionError, EventArgument, EventId, MachineDefinition, StateDefinition,
    StateDefinitionDictionary, StateId,
};
use std::collections::HashMap;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<DefinitionError>>;

/// Builder for state machine definitions with a fluent API.
///
/// States are registered the first time they are mentioned, whether through
/// [`in_state`](Self::in_state), a hierarchy or a transition target.
///
/// # Example
///
/// ```rust
/// use statetree::builder::StateMachineBuilder;
/// use statetree::core::HistoryType;
///
/// let mut builder = StateMachineBuilder::<&str, &str>::new();
/// builder
///     .define_hierarchy_on("On")
///     .with_history_type(HistoryType::Shallow)
///     .with_initial_sub_state("Idle")
///     .with_sub_state("Busy");
/// builder.in_state("Idle").on("Work").goto("Busy");
/// builder.in_state("Busy").on("Done").goto("Idle");
/// builder.with_initial_state("On");
///
/// let definition = builder.build().unwrap();
/// assert_eq!(definition.dictionary().len(), 3);
/// ```
pub struct StateMachineBuilder<S: StateId, E: EventId, A: EventArgument = ()> {
    states: HashMap<S, StateDefinition<S, E, A>>,
    initial_state: Option<S>,
    initially_last_active: HashMap<S, S>,
    hierarchy_errors: Vec<DefinitionError>,
}

impl<S: StateId, E: EventId, A: EventArgument> StateMachineBuilder<S, E, A> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            initial_state: None,
            initially_last_active: HashMap::new(),
            hierarchy_errors: Vec::new(),
        }
    }

    /// Define entry actions, exit actions and transitions of `state`.
    pub fn in_state(&mut self, state: S) -> StateBuilder<'_, S, E, A> {
        self.state_mut(&state);
        StateBuilder::new(self, state)
    }

    /// Define the sub-states and history policy of `super_state`.
    pub fn define_hierarchy_on(&mut self, super_state: S) -> HierarchyBuilder<'_, S, E, A> {
        self.state_mut(&super_state);
        HierarchyBuilder::new(self, super_state)
    }

    /// Set the state entered by `initialize()` (required).
    pub fn with_initial_state(&mut self, state: S) -> &mut Self {
        self.initial_state = Some(state);
        self
    }

    /// Validate the definition, accumulating ALL problems.
    pub fn build(self) -> Result<MachineDefinition<S, E, A>, BuildError> {
        let initial_state = self
            .initial_state
            .clone()
            .ok_or(BuildError::MissingInitialState)?;

        let mut checks: Vec<Check> = self
            .hierarchy_errors
            .iter()
            .cloned()
            .map(Validation::fail)
            .collect();
        checks.push(self.check_initial_state(&initial_state));
        checks.extend(self.states.keys().map(|state| self.check_acyclic(state)));
        checks.extend(self.states.values().map(check_initial_sub_state));
        checks.extend(self.states.values().flat_map(check_unconditional_transitions));

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(MachineDefinition {
                dictionary: Arc::new(StateDefinitionDictionary::new(self.states)),
                initial_state,
                initially_last_active_states: self.initially_last_active,
            }),
            Validation::Failure(errors) => Err(BuildError::InvalidDefinition(
                errors.iter().cloned().collect(),
            )),
        }
    }

    pub(crate) fn state_mut(&mut self, state: &S) -> &mut StateDefinition<S, E, A> {
        self.states
            .entry(state.clone())
            .or_insert_with(|| StateDefinition::new(state.clone()))
    }

    /// Attach `sub_state` to `super_state`; a state can only be attached once.
    pub(crate) fn attach_sub_state(&mut self, super_state: &S, sub_state: &S) {
        if super_state == sub_state {
            self.hierarchy_errors.push(DefinitionError::SelfSuperState {
                state: format!("{sub_state:?}"),
            });
            return;
        }

        match self.state_mut(sub_state).super_state.clone() {
            Some(existing) if existing == *super_state => {}
            Some(existing) => {
                self.hierarchy_errors
                    .push(DefinitionError::SuperStateAlreadySet {
                        state: format!("{sub_state:?}"),
                        existing: format!("{existing:?}"),
                        requested: format!("{super_state:?}"),
                    });
            }
            None => {
                self.state_mut(sub_state).super_state = Some(super_state.clone());
                self.state_mut(super_state).sub_states.push(sub_state.clone());
            }
        }
    }

    pub(crate) fn set_initial_sub_state(&mut self, super_state: &S, sub_state: &S) {
        self.state_mut(super_state).initial_sub_state = Some(sub_state.clone());
        self.initially_last_active
            .insert(super_state.clone(), sub_state.clone());
    }

    fn check_initial_state(&self, initial_state: &S) -> Check {
        if self.states.contains_key(initial_state) {
            Validation::success(())
        } else {
            Validation::fail(DefinitionError::UnknownInitialState {
                state: format!("{initial_state:?}"),
            })
        }
    }

    fn check_acyclic(&self, state: &S) -> Check {
        let mut current = self.states.get(state).and_then(|d| d.super_state.as_ref());
        for _ in 0..self.states.len() {
            match current {
                Some(parent) if parent == state => {
                    return Validation::fail(DefinitionError::CyclicHierarchy {
                        state: format!("{state:?}"),
                    })
                }
                Some(parent) => {
                    current = self.states.get(parent).and_then(|d| d.super_state.as_ref());
                }
                None => break,
            }
        }
        Validation::success(())
    }
}

impl<S: StateId, E: EventId, A: EventArgument> Default for StateMachineBuilder<S, E, A> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_initial_sub_state<S: StateId, E: EventId, A: EventArgument>(
    definition: &StateDefinition<S, E, A>,
) -> Check {
    match definition.initial_sub_state() {
        Some(initial) if !definition.has_sub_state(initial) => {
            Validation::fail(DefinitionError::InitialStateNotSubState {
                state: format!("{:?}", definition.id()),
                initial: format!("{initial:?}"),
            })
        }
        _ => Validation::success(()),
    }
}

/// At most one unconditional transition per event, and it must come last.
fn check_unconditional_transitions<S: StateId, E: EventId, A: EventArgument>(
    definition: &StateDefinition<S, E, A>,
) -> Vec<Check> {
    definition
        .transitions()
        .map(|(event, transitions)| {
            let unconditional = transitions.iter().filter(|t| t.is_unconditional()).count();
            let last_is_unconditional = transitions.last().is_some_and(|t| t.is_unconditional());
            let state = format!("{:?}", definition.id());
            let event = format!("{event:?}");

            if unconditional > 1 {
                Validation::fail(DefinitionError::MultipleUnconditionalTransitions { state, event })
            } else if unconditional == 1 && !last_is_unconditional {
                Validation::fail(DefinitionError::UnconditionalTransitionNotLast { state, event })
            } else {
                Validation::success(())
            }
        })
        .collect()
}

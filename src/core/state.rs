//! State and event identifiers and the per-state definition record.
//!
//! States live in an arena (`StateDefinitionDictionary`) keyed by their id.
//! Hierarchy links are stored as ids and resolved through that arena, so a
//! definition never owns its parent or children.

use crate::core::action::Action;
use crate::core::transition::TransitionDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of a state.
///
/// Only equality and hashing are needed by the resolution algorithm; no
/// ordering is ever required. Implemented for every type meeting the bounds.
///
/// # Example
///
/// ```rust
/// use statetree::core::StateId;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn takes_state<S: StateId>(_state: S) {}
/// takes_state(Door::Open);
/// takes_state("any string id");
/// ```
pub trait StateId: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> StateId for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Identifier of an event. Same requirements as [`StateId`].
pub trait EventId: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> EventId for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Payload passed along with an event to guards and actions.
pub trait EventArgument: Clone + Debug + Send + Sync + 'static {}

impl<T> EventArgument for T where T: Clone + Debug + Send + Sync + 'static {}

/// Policy selecting which sub-state is entered when a compound state is
/// entered again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryType {
    /// Always enter the initial sub-state.
    #[default]
    None,
    /// Enter the last active direct sub-state, then follow initial sub-states.
    Shallow,
    /// Restore the last active sub-state at every level of the hierarchy.
    Deep,
}

/// Definition of a single state: hierarchy links, history policy, entry and
/// exit actions and the transitions it declares.
pub struct StateDefinition<S: StateId, E: EventId, A: EventArgument> {
    pub(crate) id: S,
    pub(crate) super_state: Option<S>,
    pub(crate) sub_states: Vec<S>,
    pub(crate) initial_sub_state: Option<S>,
    pub(crate) history_type: HistoryType,
    pub(crate) entry_actions: Vec<Action<A>>,
    pub(crate) exit_actions: Vec<Action<A>>,
    pub(crate) transitions: HashMap<E, Vec<TransitionDefinition<S, E, A>>>,
}

impl<S: StateId, E: EventId, A: EventArgument> StateDefinition<S, E, A> {
    pub(crate) fn new(id: S) -> Self {
        Self {
            id,
            super_state: None,
            sub_states: Vec::new(),
            initial_sub_state: None,
            history_type: HistoryType::None,
            entry_actions: Vec::new(),
            exit_actions: Vec::new(),
            transitions: HashMap::new(),
        }
    }

    pub fn id(&self) -> &S {
        &self.id
    }

    /// The containing state, if this is not a root state.
    pub fn super_state(&self) -> Option<&S> {
        self.super_state.as_ref()
    }

    /// Direct sub-states in declaration order.
    pub fn sub_states(&self) -> &[S] {
        &self.sub_states
    }

    pub fn initial_sub_state(&self) -> Option<&S> {
        self.initial_sub_state.as_ref()
    }

    pub fn history_type(&self) -> HistoryType {
        self.history_type
    }

    pub fn entry_actions(&self) -> &[Action<A>] {
        &self.entry_actions
    }

    pub fn exit_actions(&self) -> &[Action<A>] {
        &self.exit_actions
    }

    /// Transitions declared on this state for `event`, in evaluation order.
    pub fn transitions_for(&self, event: &E) -> &[TransitionDefinition<S, E, A>] {
        self.transitions
            .get(event)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every transition declared on this state, grouped by event.
    pub fn transitions(&self) -> impl Iterator<Item = (&E, &[TransitionDefinition<S, E, A>])> {
        self.transitions
            .iter()
            .map(|(event, transitions)| (event, transitions.as_slice()))
    }

    /// Whether `state` is a direct sub-state of this state.
    pub fn has_sub_state(&self, state: &S) -> bool {
        self.sub_states.contains(state)
    }
}

impl<S: StateId, E: EventId, A: EventArgument> Debug for StateDefinition<S, E, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDefinition")
            .field("id", &self.id)
            .field("super_state", &self.super_state)
            .field("sub_states", &self.sub_states)
            .field("initial_sub_state", &self.initial_sub_state)
            .field("history_type", &self.history_type)
            .field("entry_actions", &self.entry_actions.len())
            .field("exit_actions", &self.exit_actions.len())
            .field("events", &self.transitions.keys().collect::<Vec<_>>())
            .finish()
    }
}

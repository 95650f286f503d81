//! Transition definitions.

use crate::core::action::Action;
use crate::core::guard::Guard;
use crate::core::state::{EventArgument, EventId, StateId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A candidate transition declared on `source` for `event`.
///
/// Without a target the transition is internal: its actions run but no state
/// is exited or entered. Without a guard it is unconditional.
pub struct TransitionDefinition<S: StateId, E: EventId, A: EventArgument> {
    pub(crate) source: S,
    pub(crate) event: E,
    pub(crate) target: Option<S>,
    pub(crate) guard: Option<Guard<A>>,
    pub(crate) actions: Vec<Action<A>>,
}

impl<S: StateId, E: EventId, A: EventArgument> TransitionDefinition<S, E, A> {
    pub(crate) fn new(source: S, event: E) -> Self {
        Self {
            source,
            event,
            target: None,
            guard: None,
            actions: Vec::new(),
        }
    }

    /// The state declaring this transition.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn event(&self) -> &E {
        &self.event
    }

    pub fn target(&self) -> Option<&S> {
        self.target.as_ref()
    }

    pub fn guard(&self) -> Option<&Guard<A>> {
        self.guard.as_ref()
    }

    pub fn actions(&self) -> &[Action<A>] {
        &self.actions
    }

    pub fn is_internal(&self) -> bool {
        self.target.is_none()
    }

    pub fn is_unconditional(&self) -> bool {
        self.guard.is_none()
    }
}

impl<S: StateId, E: EventId, A: EventArgument> fmt::Debug for TransitionDefinition<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionDefinition")
            .field("source", &self.source)
            .field("event", &self.event)
            .field("target", &self.target)
            .field("guard", &self.guard)
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// An event together with its optional argument, as held in the queues.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventInformation<E, A> {
    pub event: E,
    pub argument: Option<A>,
}

impl<E, A> EventInformation<E, A> {
    pub fn new(event: E, argument: Option<A>) -> Self {
        Self { event, argument }
    }
}

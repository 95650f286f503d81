//! Per-fire scratch record.

use crate::core::{EventArgument, EventId, StateId};
use std::fmt;

/// Whether a state was entered or exited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Enter,
    Exit,
}

/// One step of the exit/entry traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record<S> {
    pub state: S,
    pub kind: RecordKind,
}

/// Context of one event being fired, or of the initial state entry.
///
/// Created when processing of the event starts and discarded afterwards.
/// `state` is the active leaf at the start of the fire; it is `None` while
/// entering the initial state, which also carries no event.
#[derive(Clone)]
pub struct TransitionContext<S: StateId, E: EventId, A: EventArgument> {
    state: Option<S>,
    event: Option<E>,
    argument: Option<A>,
    records: Vec<Record<S>>,
}

impl<S: StateId, E: EventId, A: EventArgument> TransitionContext<S, E, A> {
    pub(crate) fn for_event(state: S, event: E, argument: Option<A>) -> Self {
        Self {
            state: Some(state),
            event: Some(event),
            argument,
            records: Vec::new(),
        }
    }

    pub(crate) fn for_initial_state() -> Self {
        Self {
            state: None,
            event: None,
            argument: None,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn event(&self) -> Option<&E> {
        self.event.as_ref()
    }

    pub fn argument(&self) -> Option<&A> {
        self.argument.as_ref()
    }

    /// Exits and entries performed so far, in execution order.
    pub fn records(&self) -> &[Record<S>] {
        &self.records
    }

    pub(crate) fn add_record(&mut self, state: S, kind: RecordKind) {
        self.records.push(Record { state, kind });
    }

    /// Human readable trace such as `Exit A1 -> Exit A -> Enter B`.
    pub fn records_summary(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("{:?} {:?}", record.kind, record.state))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl<S: StateId, E: EventId, A: EventArgument> fmt::Debug for TransitionContext<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionContext")
            .field("state", &self.state)
            .field("event", &self.event)
            .field("argument", &self.argument)
            .field("records", &self.records_summary())
            .finish()
    }
}

/// Outcome of trying to fire an event at one state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionResult<S> {
    /// A transition fired; the machine is now in this leaf state.
    Fired(S),
    NotFired,
}

impl<S> TransitionResult<S> {
    pub fn is_fired(&self) -> bool {
        matches!(self, TransitionResult::Fired(_))
    }
}

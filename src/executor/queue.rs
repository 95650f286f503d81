//! Pending event queues shared by every executor.

use crate::core::{EventArgument, EventId, EventInformation, StateId};
use crate::engine::{PendingEvents, StateMachine, StateMachineError};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// A priority lane drained before a FIFO lane of normal events.
#[derive(Debug)]
pub(crate) struct EventQueues<E, A> {
    events: VecDeque<EventInformation<E, A>>,
    priority_events: VecDeque<EventInformation<E, A>>,
}

impl<E: Clone, A: Clone> EventQueues<E, A> {
    pub(crate) fn new() -> Self {
        Self {
            events: VecDeque::new(),
            priority_events: VecDeque::new(),
        }
    }

    pub(crate) fn push(&mut self, event: EventInformation<E, A>) {
        self.events.push_back(event);
    }

    /// The most recent priority event is processed first.
    pub(crate) fn push_priority(&mut self, event: EventInformation<E, A>) {
        self.priority_events.push_front(event);
    }

    pub(crate) fn pop(&mut self) -> Option<EventInformation<E, A>> {
        self.priority_events
            .pop_front()
            .or_else(|| self.events.pop_front())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty() && self.priority_events.is_empty()
    }

    /// Both lanes in drain order: `(events, priority_events)`.
    pub(crate) fn snapshot(
        &self,
    ) -> (Vec<EventInformation<E, A>>, Vec<EventInformation<E, A>>) {
        (
            self.events.iter().cloned().collect(),
            self.priority_events.iter().cloned().collect(),
        )
    }

    /// Append loaded events behind anything already queued, keeping their
    /// drain order.
    pub(crate) fn restore(&mut self, pending: PendingEvents<E, A>) {
        self.events.extend(pending.events);
        self.priority_events.extend(pending.priority_events);
    }
}

/// Queue `event` for `machine`, which must be initialized or loaded.
pub(crate) fn queue_event<S: StateId, E: EventId, A: EventArgument>(
    machine: &StateMachine<S, E, A>,
    queues: &Mutex<EventQueues<E, A>>,
    event: EventInformation<E, A>,
    priority: bool,
) -> Result<(), StateMachineError> {
    if !machine.is_initialized() {
        return Err(StateMachineError::NotInitialized);
    }

    let name = machine.name();
    if priority {
        machine
            .extensions()
            .for_each(|extension| extension.event_queued_with_priority(name, &event));
        queues.lock().push_priority(event);
    } else {
        machine
            .extensions()
            .for_each(|extension| extension.event_queued(name, &event));
        queues.lock().push(event);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(event: &'static str) -> EventInformation<&'static str, ()> {
        EventInformation::new(event, None)
    }

    #[test]
    fn priority_lane_drains_first_most_recent_first() {
        let mut queues = EventQueues::new();
        queues.push(info("A"));
        queues.push_priority(info("B"));
        queues.push_priority(info("C"));

        let order: Vec<_> = std::iter::from_fn(|| queues.pop()).map(|e| e.event).collect();

        assert_eq!(order, vec!["C", "B", "A"]);
        assert!(queues.is_empty());
    }

    #[test]
    fn snapshot_then_restore_keeps_drain_order() {
        let mut queues = EventQueues::new();
        queues.push(info("A"));
        queues.push(info("B"));
        queues.push_priority(info("P1"));
        queues.push_priority(info("P2"));
        let (events, priority_events) = queues.snapshot();

        let mut restored = EventQueues::new();
        restored.restore(PendingEvents {
            events,
            priority_events,
        });

        let order: Vec<_> = std::iter::from_fn(|| restored.pop()).map(|e| e.event).collect();
        assert_eq!(order, vec!["P2", "P1", "A", "B"]);
    }
}

//! Builder for the candidate transitions of one (state, event) pair.

use crate::builder::machine::StateMachineBuilder;
use crate::core::{Action, EventArgument, EventId, Guard, StateId, TransitionDefinition};

/// Declares candidate transitions in evaluation order.
///
/// `when` starts a guarded candidate and `otherwise` the unconditional
/// fallback. `goto` and `execute` apply to the latest candidate, starting an
/// unconditional one if none was started. A candidate without `goto` is an
/// internal transition: its actions run and the state is kept.
pub struct TransitionBuilder<'a, S: StateId, E: EventId, A: EventArgument> {
    machine: &'a mut StateMachineBuilder<S, E, A>,
    source: S,
    event: E,
    current: Option<usize>,
}

impl<'a, S: StateId, E: EventId, A: EventArgument> TransitionBuilder<'a, S, E, A> {
    pub(crate) fn new(machine: &'a mut StateMachineBuilder<S, E, A>, source: S, event: E) -> Self {
        Self {
            machine,
            source,
            event,
            current: None,
        }
    }

    /// Start a candidate taken only when `guard` matches.
    pub fn when(mut self, guard: Guard<A>) -> Self {
        let index = self.push_candidate();
        self.candidates()[index].guard = Some(guard);
        self
    }

    /// Start the unconditional candidate, taken when no guard before it matched.
    pub fn otherwise(mut self) -> Self {
        self.push_candidate();
        self
    }

    pub fn goto(mut self, target: S) -> Self {
        self.machine.state_mut(&target);
        let index = self.current_candidate();
        self.candidates()[index].target = Some(target);
        self
    }

    pub fn execute(mut self, action: Action<A>) -> Self {
        let index = self.current_candidate();
        self.candidates()[index].actions.push(action);
        self
    }

    /// Continue with transitions for another event of the same state.
    pub fn on(self, event: E) -> Self {
        Self::new(self.machine, self.source, event)
    }

    fn candidates(&mut self) -> &mut Vec<TransitionDefinition<S, E, A>> {
        self.machine
            .state_mut(&self.source)
            .transitions
            .entry(self.event.clone())
            .or_default()
    }

    fn push_candidate(&mut self) -> usize {
        let candidate = TransitionDefinition::new(self.source.clone(), self.event.clone());
        let candidates = self.candidates();
        candidates.push(candidate);
        let index = candidates.len() - 1;
        self.current = Some(index);
        index
    }

    fn current_candidate(&mut self) -> usize {
        match self.current {
            Some(index) => index,
            None => self.push_candidate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::StateMachineBuilder;
    use crate::core::{Action, Guard};

    #[test]
    fn execute_without_goto_declares_internal_transition() {
        let mut builder = StateMachineBuilder::<&str, &str>::new();
        builder
            .in_state("A")
            .on("Tick")
            .execute(Action::from_fn(|| {}))
            .execute(Action::from_fn(|| {}));
        builder.with_initial_state("A");

        let definition = builder.build().unwrap();
        let transitions = definition.dictionary().get(&"A").unwrap().transitions_for(&"Tick");

        assert_eq!(transitions.len(), 1);
        assert!(transitions[0].is_internal());
        assert_eq!(transitions[0].actions().len(), 2);
    }

    #[test]
    fn each_when_starts_a_new_candidate() {
        let mut builder = StateMachineBuilder::<&str, &str>::new();
        builder
            .in_state("A")
            .on("Go")
            .when(Guard::new(|_| false))
            .goto("B")
            .when(Guard::new(|_| true))
            .goto("C")
            .on("Back")
            .goto("A");
        builder.with_initial_state("A");

        let definition = builder.build().unwrap();
        let state = definition.dictionary().get(&"A").unwrap();

        let targets: Vec<_> = state
            .transitions_for(&"Go")
            .iter()
            .map(|t| t.target().copied())
            .collect();
        assert_eq!(targets, vec![Some("B"), Some("C")]);
        assert_eq!(state.transitions_for(&"Back").len(), 1);
    }
}

//! Integration tests for hierarchical resolution on the passive executor.

use parking_lot::Mutex;
use statetree::core::{EventInformation, TransitionDefinition};
use statetree::engine::TransitionContext;
use statetree::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

type State = &'static str;
type Event = &'static str;
type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(log: &Log, line: impl Into<String>) -> Action<u32> {
    let log = Arc::clone(log);
    let line = line.into();
    Action::from_fn(move || log.lock().push(line.clone()))
}

fn traced(builder: &mut StateMachineBuilder<State, Event, u32>, log: &Log, states: &[State]) {
    for state in states {
        builder
            .in_state(*state)
            .on_entry(record(log, format!("enter {state}")))
            .on_exit(record(log, format!("exit {state}")));
    }
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}

/// Root { S1 { S1a (initial), S1b }, S2 { S2a (initial), S2b } }, S1 keeps shallow history.
fn two_branches(log: &Log) -> StateMachineBuilder<State, Event, u32> {
    let mut builder = StateMachineBuilder::new();
    traced(&mut builder, log, &["Root", "S1", "S1a", "S1b", "S2", "S2a", "S2b"]);
    builder
        .define_hierarchy_on("Root")
        .with_initial_sub_state("S1")
        .with_sub_state("S2");
    builder
        .define_hierarchy_on("S1")
        .with_history_type(HistoryType::Shallow)
        .with_initial_sub_state("S1a")
        .with_sub_state("S1b");
    builder
        .define_hierarchy_on("S2")
        .with_initial_sub_state("S2a")
        .with_sub_state("S2b");
    builder
        .in_state("S1")
        .on("Go")
        .goto("S2")
        .execute(record(log, "action Go"))
        .on("Tick")
        .execute(record(log, "action Tick"));
    builder.in_state("S1a").on("Next").goto("S1b");
    builder.in_state("S2").on("Back").goto("S1");
    builder
        .in_state("S2a")
        .on("Self")
        .goto("S2a")
        .on("Up")
        .goto("S2")
        .on("Deeper")
        .goto("S2b");
    builder.with_initial_state("Root");
    builder
}

fn started(builder: StateMachineBuilder<State, Event, u32>) -> PassiveStateMachine<State, Event, u32> {
    let machine = builder.build().unwrap().create_passive_state_machine("test");
    machine.initialize().unwrap();
    machine.start().unwrap();
    machine
}

#[test]
fn initial_state_enters_root_down_to_leaf() {
    let log = new_log();
    let machine = started(two_branches(&log));

    assert_eq!(take(&log), vec!["enter Root", "enter S1", "enter S1a"]);
    assert_eq!(machine.current_state(), Some("S1a"));
}

#[test]
fn transition_exits_to_common_ancestor_then_enters_target_leaf() {
    let log = new_log();
    let machine = started(two_branches(&log));
    take(&log);

    machine.fire("Go").unwrap();

    assert_eq!(
        take(&log),
        vec!["exit S1a", "exit S1", "action Go", "enter S2", "enter S2a"]
    );
    assert_eq!(machine.current_state(), Some("S2a"));
}

#[test]
fn shallow_history_returns_to_last_active_sub_state() {
    let log = new_log();
    let machine = started(two_branches(&log));

    machine.fire("Next").unwrap();
    machine.fire("Go").unwrap();
    take(&log);
    machine.fire("Back").unwrap();

    assert_eq!(take(&log), vec!["exit S2a", "exit S2", "enter S1", "enter S1b"]);
    assert_eq!(machine.current_state(), Some("S1b"));
}

#[test]
fn history_none_always_enters_initial_sub_state() {
    let log = new_log();
    let machine = started(two_branches(&log));

    machine.fire("Go").unwrap();
    machine.fire("Deeper").unwrap();
    assert_eq!(machine.current_state(), Some("S2b"));
    machine.fire("Back").unwrap();
    machine.fire("Go").unwrap();

    assert_eq!(machine.current_state(), Some("S2a"));
    assert_eq!(machine.history().last_active(&"S2"), Some(&"S2b"));
}

#[test]
fn self_transition_exits_and_reenters() {
    let log = new_log();
    let machine = started(two_branches(&log));
    machine.fire("Go").unwrap();
    take(&log);

    machine.fire("Self").unwrap();

    assert_eq!(take(&log), vec!["exit S2a", "enter S2a"]);
    assert_eq!(machine.current_state(), Some("S2a"));
}

#[test]
fn transition_to_ancestor_reenters_the_ancestor() {
    let log = new_log();
    let machine = started(two_branches(&log));
    machine.fire("Go").unwrap();
    take(&log);

    machine.fire("Up").unwrap();

    assert_eq!(
        take(&log),
        vec!["exit S2a", "exit S2", "enter S2", "enter S2a"]
    );
}

#[test]
fn internal_transition_runs_actions_and_keeps_the_leaf() {
    let log = new_log();
    let machine = started(two_branches(&log));
    take(&log);

    machine.fire("Tick").unwrap();

    assert_eq!(take(&log), vec!["action Tick"]);
    assert_eq!(machine.current_state(), Some("S1a"));
}

#[test]
fn unhandled_event_is_declined() {
    let log = new_log();
    let machine = two_branches(&log).build().unwrap().create_passive_state_machine("test");
    let declined = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&declined);
    machine.on_transition_declined(move |args| {
        assert_eq!(args.event, Some("Unknown"));
        counter.fetch_add(1, Ordering::SeqCst);
    });
    machine.initialize().unwrap();
    machine.start().unwrap();

    machine.fire("Unknown").unwrap();

    assert_eq!(declined.load(Ordering::SeqCst), 1);
    assert_eq!(machine.current_state(), Some("S1a"));
}

#[test]
fn deep_history_restores_the_whole_leaf_path() {
    let log = new_log();
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .define_hierarchy_on("P")
        .with_history_type(HistoryType::Deep)
        .with_initial_sub_state("Q")
        .with_sub_state("R");
    builder
        .define_hierarchy_on("Q")
        .with_initial_sub_state("Q1")
        .with_sub_state("Q2");
    builder.in_state("Q1").on("Next").goto("Q2");
    builder.in_state("P").on("Leave").goto("X");
    builder.in_state("X").on("Return").goto("P");
    builder.with_initial_state("P");
    traced(&mut builder, &log, &["P", "Q", "Q1", "Q2", "X"]);
    let machine = started(builder);

    machine.fire("Next").unwrap();
    machine.fire("Leave").unwrap();
    take(&log);
    machine.fire("Return").unwrap();

    assert_eq!(take(&log), vec!["exit X", "enter P", "enter Q", "enter Q2"]);
    assert_eq!(machine.current_state(), Some("Q2"));
}

#[test]
fn guard_failure_is_a_non_match_reported_once() {
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("Start")
        .on("Decide")
        .when(Guard::fallible(|_| Err(ActionError::msg("g1 exploded"))))
        .goto("T1")
        .when(Guard::new(|_| false))
        .goto("T2")
        .otherwise()
        .goto("T3");
    builder.with_initial_state("Start");
    let machine = builder.build().unwrap().create_passive_state_machine("guards");

    let reported = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    machine.on_transition_exception(move |args| sink.lock().push(args.error.to_string()));
    machine.initialize().unwrap();
    machine.start().unwrap();

    machine.fire("Decide").unwrap();

    assert_eq!(machine.current_state(), Some("T3"));
    assert_eq!(*reported.lock(), vec!["g1 exploded".to_string()]);
}

#[test]
fn guards_see_the_event_argument() {
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("Idle")
        .on("Load")
        .when(Guard::with_argument(|weight: &u32| *weight > 100))
        .goto("Heavy")
        .otherwise()
        .goto("Light");
    builder.with_initial_state("Idle");
    let machine = started(builder);

    machine.fire_with("Load", 250).unwrap();

    assert_eq!(machine.current_state(), Some("Heavy"));
}

#[test]
fn failing_action_does_not_stop_sibling_actions() {
    let log = new_log();
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("A")
        .on("Go")
        .goto("B")
        .execute(Action::new(|_| Err(ActionError::msg("first failed"))))
        .execute(record(&log, "second ran"));
    builder.with_initial_state("A");
    let machine = builder.build().unwrap().create_passive_state_machine("actions");
    machine.on_transition_exception(|_| {});
    machine.initialize().unwrap();
    machine.start().unwrap();

    machine.fire("Go").unwrap();

    assert_eq!(take(&log), vec!["second ran"]);
    assert_eq!(machine.current_state(), Some("B"));
}

#[test]
fn failure_without_exception_listener_escapes() {
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("B")
        .on_entry(Action::new(|_| Err(ActionError::msg("entry failed"))));
    builder.in_state("A").on("Go").goto("B");
    builder.with_initial_state("A");
    let machine = started(builder);

    let error = machine.fire("Go").unwrap_err();

    assert!(matches!(error, StateMachineError::UnhandledTransitionException(_)));
    assert_eq!(error.to_string(), "Unhandled transition exception: entry failed");
}

#[test]
fn missing_argument_is_reported_as_action_error() {
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("A")
        .on("Go")
        .goto("B")
        .execute(Action::with_argument(|_: &u32| Ok(())));
    builder.with_initial_state("A");
    let machine = builder.build().unwrap().create_passive_state_machine("arguments");
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    machine.on_transition_exception(move |args| sink.lock().push(args.error.to_string()));
    machine.initialize().unwrap();
    machine.start().unwrap();

    machine.fire("Go").unwrap();

    assert_eq!(*errors.lock(), vec!["Event argument is missing".to_string()]);
}

#[test]
fn priority_events_are_processed_before_queued_events() {
    let log = new_log();
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("Idle")
        .on("A")
        .execute(record(&log, "A"))
        .on("B")
        .execute(record(&log, "B"))
        .on("C")
        .execute(record(&log, "C"));
    builder.with_initial_state("Idle");
    let machine = builder.build().unwrap().create_passive_state_machine("priority");
    machine.initialize().unwrap();

    machine.fire("A").unwrap();
    machine.fire_priority("B").unwrap();
    machine.fire_priority("C").unwrap();
    assert!(take(&log).is_empty());
    machine.start().unwrap();

    assert_eq!(take(&log), vec!["C", "B", "A"]);
}

#[test]
fn queued_event_is_drained_once_by_start() {
    let entries = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&entries);
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder.in_state("A").on("X").goto("B");
    builder.in_state("B").on_entry(Action::from_fn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    builder.with_initial_state("A");
    let machine = builder.build().unwrap().create_passive_state_machine("counter");
    machine.initialize().unwrap();

    machine.fire("X").unwrap();
    assert_eq!(entries.load(Ordering::SeqCst), 0);
    assert_eq!(machine.current_state(), None);

    machine.start().unwrap();
    assert_eq!(entries.load(Ordering::SeqCst), 1);
    machine.start().unwrap();
    assert_eq!(entries.load(Ordering::SeqCst), 1);
    assert_eq!(machine.current_state(), Some("B"));
}

#[test]
fn failed_initial_entry_is_retried_by_the_next_drain() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("A")
        .on_entry(Action::new(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ActionError::msg("not ready"))
            } else {
                Ok(())
            }
        }))
        .on("Go")
        .goto("B");
    builder.with_initial_state("A");
    let machine = builder.build().unwrap().create_passive_state_machine("retry");
    machine.initialize().unwrap();

    assert!(matches!(
        machine.start(),
        Err(StateMachineError::UnhandledTransitionException(_))
    ));
    assert_eq!(machine.current_state(), None);

    machine.fire("Go").unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(machine.current_state(), Some("B"));
}

#[test]
fn events_fired_while_stopped_wait_for_next_start() {
    let log = new_log();
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("Idle")
        .on("A")
        .execute(record(&log, "A"))
        .on("B")
        .execute(record(&log, "B"));
    builder.with_initial_state("Idle");
    let machine = started(builder);

    machine.stop();
    machine.fire("A").unwrap();
    machine.fire("B").unwrap();
    assert!(!machine.is_running());
    assert!(take(&log).is_empty());

    machine.start().unwrap();
    assert_eq!(take(&log), vec!["A", "B"]);
}

#[test]
fn action_firing_an_event_is_processed_after_the_current_transition() {
    let log = new_log();
    let handle: Arc<OnceLock<PassiveStateMachine<State, Event, u32>>> = Arc::new(OnceLock::new());
    let reentrant = Arc::clone(&handle);
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    traced(&mut builder, &log, &["A", "B", "C"]);
    builder
        .in_state("A")
        .on("Go")
        .goto("B")
        .execute(Action::new(move |_| {
            if let Some(machine) = reentrant.get() {
                machine.fire("Next").map_err(ActionError::source)?;
            }
            Ok(())
        }));
    builder.in_state("B").on("Next").goto("C");
    builder.with_initial_state("A");
    let machine = builder.build().unwrap().create_passive_state_machine("reentrant");
    let _ = handle.set(machine.clone());
    machine.initialize().unwrap();
    machine.start().unwrap();
    take(&log);

    machine.fire("Go").unwrap();

    assert_eq!(take(&log), vec!["exit A", "enter B", "exit B", "enter C"]);
    assert_eq!(machine.current_state(), Some("C"));
}

#[test]
fn lifecycle_misuse_is_rejected() {
    let log = new_log();
    let machine = two_branches(&log).build().unwrap().create_passive_state_machine("life");

    assert!(matches!(machine.fire("Go"), Err(StateMachineError::NotInitialized)));
    assert!(matches!(machine.start(), Err(StateMachineError::NotInitialized)));

    machine.initialize().unwrap();
    assert!(matches!(
        machine.initialize(),
        Err(StateMachineError::AlreadyInitialized)
    ));

    let mut checkpoint = Checkpoint::new("life");
    assert!(matches!(
        machine.load(&mut checkpoint),
        Err(StateMachineError::AlreadyInitialized)
    ));
}

/// Replaces every argument with 500 and every entry-action error with a fixed one.
struct Rewriter {
    handled: Arc<Mutex<Vec<String>>>,
}

impl Extension<State, Event, u32> for Rewriter {
    fn firing_event(
        &self,
        _machine: &str,
        event: EventInformation<Event, u32>,
    ) -> EventInformation<Event, u32> {
        EventInformation::new(event.event, Some(500))
    }

    fn handling_entry_action_exception(
        &self,
        _machine: &str,
        _state: &State,
        _context: &TransitionContext<State, Event, u32>,
        _error: ActionError,
    ) -> ActionError {
        ActionError::msg("rewritten")
    }

    fn handled_entry_action_exception(
        &self,
        _machine: &str,
        _state: &State,
        _context: &TransitionContext<State, Event, u32>,
        error: &ActionError,
    ) {
        self.handled.lock().push(error.to_string());
    }

    fn skipped_transition(
        &self,
        _machine: &str,
        _transition: &TransitionDefinition<State, Event, u32>,
        _context: &TransitionContext<State, Event, u32>,
    ) {
        self.handled.lock().push("skipped".to_string());
    }
}

#[test]
fn extensions_substitute_events_and_errors() {
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("Idle")
        .on("Load")
        .when(Guard::with_argument(|weight: &u32| *weight > 100))
        .goto("Heavy")
        .otherwise()
        .goto("Light");
    builder
        .in_state("Heavy")
        .on_entry(Action::new(|_| Err(ActionError::msg("original"))));
    builder.with_initial_state("Idle");
    let machine = builder.build().unwrap().create_passive_state_machine("ext");
    let handled = Arc::new(Mutex::new(Vec::new()));
    machine.add_extension(Arc::new(Rewriter {
        handled: Arc::clone(&handled),
    }));
    let reported = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    machine.on_transition_exception(move |args| sink.lock().push(args.error.to_string()));
    machine.initialize().unwrap();
    machine.start().unwrap();

    machine.fire_with("Load", 1).unwrap();

    assert_eq!(machine.current_state(), Some("Heavy"));
    assert_eq!(*handled.lock(), vec!["rewritten".to_string()]);
    assert_eq!(*reported.lock(), vec!["rewritten".to_string()]);
}

/// Prefixes every guard, exit and transition-action error with the hook
/// that saw it, and records what the matching `handled_*` hooks receive.
struct Relabel {
    handled: Arc<Mutex<Vec<String>>>,
}

impl Extension<State, Event, u32> for Relabel {
    fn handling_guard_exception(
        &self,
        _machine: &str,
        _transition: &TransitionDefinition<State, Event, u32>,
        _context: &TransitionContext<State, Event, u32>,
        error: ActionError,
    ) -> ActionError {
        ActionError::msg(format!("guard: {error}"))
    }

    fn handled_guard_exception(
        &self,
        _machine: &str,
        _transition: &TransitionDefinition<State, Event, u32>,
        _context: &TransitionContext<State, Event, u32>,
        error: &ActionError,
    ) {
        self.handled.lock().push(error.to_string());
    }

    fn handling_exit_action_exception(
        &self,
        _machine: &str,
        state: &State,
        _context: &TransitionContext<State, Event, u32>,
        error: ActionError,
    ) -> ActionError {
        ActionError::msg(format!("exit {state}: {error}"))
    }

    fn handled_exit_action_exception(
        &self,
        _machine: &str,
        _state: &State,
        _context: &TransitionContext<State, Event, u32>,
        error: &ActionError,
    ) {
        self.handled.lock().push(error.to_string());
    }

    fn handling_transition_exception(
        &self,
        _machine: &str,
        _transition: &TransitionDefinition<State, Event, u32>,
        _context: &TransitionContext<State, Event, u32>,
        error: ActionError,
    ) -> ActionError {
        ActionError::msg(format!("action: {error}"))
    }

    fn handled_transition_exception(
        &self,
        _machine: &str,
        _transition: &TransitionDefinition<State, Event, u32>,
        _context: &TransitionContext<State, Event, u32>,
        error: &ActionError,
    ) {
        self.handled.lock().push(error.to_string());
    }
}

#[test]
fn extensions_substitute_guard_exit_and_action_errors() {
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("Idle")
        .on_exit(Action::new(|_| Err(ActionError::msg("exit failed"))))
        .on("Go")
        .when(Guard::fallible(|_| Err(ActionError::msg("guard failed"))))
        .goto("Never")
        .otherwise()
        .goto("Busy")
        .execute(Action::new(|_| Err(ActionError::msg("action failed"))));
    builder.with_initial_state("Idle");
    let machine = builder.build().unwrap().create_passive_state_machine("relabel");
    let handled = Arc::new(Mutex::new(Vec::new()));
    machine.add_extension(Arc::new(Relabel {
        handled: Arc::clone(&handled),
    }));
    let reported = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    machine.on_transition_exception(move |args| sink.lock().push(args.error.to_string()));
    machine.initialize().unwrap();
    machine.start().unwrap();

    machine.fire("Go").unwrap();

    let expected = vec![
        "guard: guard failed".to_string(),
        "exit Idle: exit failed".to_string(),
        "action: action failed".to_string(),
    ];
    assert_eq!(machine.current_state(), Some("Busy"));
    assert_eq!(*handled.lock(), expected);
    assert_eq!(*reported.lock(), expected);
}

#[test]
fn cleared_extensions_are_no_longer_called() {
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder
        .in_state("Idle")
        .on("Load")
        .when(Guard::with_argument(|weight: &u32| *weight > 100))
        .goto("Heavy")
        .otherwise()
        .goto("Light");
    builder.with_initial_state("Idle");
    let machine = builder.build().unwrap().create_passive_state_machine("ext");
    machine.add_extension(Arc::new(Rewriter {
        handled: Arc::new(Mutex::new(Vec::new())),
    }));
    machine.add_extension(Arc::new(LoggingExtension::new()));
    machine.clear_extensions();
    machine.initialize().unwrap();
    machine.start().unwrap();

    machine.fire_with("Load", 1).unwrap();

    assert_eq!(machine.current_state(), Some("Light"));
}

#[test]
fn notifications_carry_event_and_new_state() {
    let mut builder = StateMachineBuilder::<State, Event, u32>::new();
    builder.in_state("A").on("Go").goto("B");
    builder.with_initial_state("A");
    let machine = builder.build().unwrap().create_passive_state_machine("notify");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let begin = Arc::clone(&seen);
    machine.on_transition_begin(move |args| {
        begin
            .lock()
            .push(format!("begin {:?} {:?} {:?}", args.state, args.event, args.argument))
    });
    let completed = Arc::clone(&seen);
    machine.on_transition_completed(move |args| {
        completed.lock().push(format!("completed {}", args.new_state))
    });
    machine.initialize().unwrap();
    machine.start().unwrap();

    machine.fire_with("Go", 7).unwrap();

    assert_eq!(
        *seen.lock(),
        vec![
            "begin Some(\"A\") Some(\"Go\") Some(7)".to_string(),
            "completed B".to_string()
        ]
    );
}

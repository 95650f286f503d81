//! Save/load integration tests.

use serde::{Deserialize, Serialize};
use statetree::checkpoint::CheckpointError;
use statetree::core::{EventInformation, HistoryEntry, HistoryStates};
use statetree::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum Player {
    Off,
    On,
    Stopped,
    Playing,
    Paused,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum Button {
    Power,
    Play,
    Pause,
}

fn definition() -> MachineDefinition<Player, Button, u8> {
    let mut builder = StateMachineBuilder::<Player, Button, u8>::new();
    builder
        .define_hierarchy_on(Player::On)
        .with_history_type(HistoryType::Shallow)
        .with_initial_sub_state(Player::Stopped)
        .with_sub_state(Player::Playing)
        .with_sub_state(Player::Paused);
    builder.in_state(Player::Off).on(Button::Power).goto(Player::On);
    builder.in_state(Player::On).on(Button::Power).goto(Player::Off);
    builder.in_state(Player::Stopped).on(Button::Play).goto(Player::Playing);
    builder.in_state(Player::Playing).on(Button::Pause).goto(Player::Paused);
    builder.in_state(Player::Paused).on(Button::Play).goto(Player::Playing);
    builder.with_initial_state(Player::Off);
    builder.build().unwrap()
}

fn running() -> PassiveStateMachine<Player, Button, u8> {
    let machine = definition().create_passive_state_machine("player");
    machine.initialize().unwrap();
    machine.start().unwrap();
    machine
}

#[test]
fn round_trip_restores_state_history_and_queue() {
    let machine = running();
    machine.fire(Button::Power).unwrap();
    machine.fire(Button::Play).unwrap();
    machine.fire(Button::Power).unwrap();
    machine.stop();
    machine.fire_with(Button::Power, 3).unwrap();
    machine.fire_priority(Button::Pause).unwrap();

    let mut checkpoint = Checkpoint::new(machine.name());
    machine.save(&mut checkpoint).unwrap();
    let json = checkpoint.to_json().unwrap();

    let mut restored_checkpoint = Checkpoint::from_json(&json).unwrap();
    let restored = definition().create_passive_state_machine("player");
    restored.load(&mut restored_checkpoint).unwrap();

    assert_eq!(restored.current_state(), Some(Player::Off));
    assert_eq!(restored.history(), machine.history());
    assert_eq!(
        restored_checkpoint.events,
        vec![EventInformation::new(Button::Power, Some(3))]
    );

    restored.start().unwrap();
    assert_eq!(restored.current_state(), Some(Player::Playing));
}

#[test]
fn saving_an_uninitialized_machine_saves_no_state() {
    let machine = definition().create_passive_state_machine("player");

    let mut checkpoint = Checkpoint::new("player");
    machine.save(&mut checkpoint).unwrap();

    assert_eq!(checkpoint.current_state, None);
    assert!(checkpoint.events.is_empty());
}

#[test]
fn loaded_machine_continues_without_reentering_initial_state() {
    let mut checkpoint = Checkpoint::<Player, Button, u8>::new("player");
    checkpoint.current_state = Some(Player::Paused);
    checkpoint.history = vec![HistoryEntry {
        super_state: Player::On,
        last_active: Player::Paused,
    }];

    let machine = definition().create_passive_state_machine("player");
    machine.load(&mut checkpoint).unwrap();
    assert!(machine.is_initialized());
    assert!(matches!(
        machine.initialize(),
        Err(StateMachineError::AlreadyInitialized)
    ));
    machine.start().unwrap();
    machine.fire(Button::Play).unwrap();

    assert_eq!(machine.current_state(), Some(Player::Playing));
}

#[test]
fn load_rejects_history_that_does_not_fit_the_hierarchy() {
    let mut checkpoint = Checkpoint::<Player, Button, u8>::new("player");
    checkpoint.current_state = Some(Player::Off);
    checkpoint.history = vec![HistoryEntry {
        super_state: Player::On,
        last_active: Player::Off,
    }];

    let machine = definition().create_passive_state_machine("player");
    let error = machine.load(&mut checkpoint).unwrap_err();

    assert_eq!(
        error.to_string(),
        "Cannot restore history: Off is not a sub-state of On"
    );
    assert!(!machine.is_initialized());
}

#[test]
fn load_rejects_unknown_current_state() {
    let mut builder = StateMachineBuilder::<Player, Button, u8>::new();
    builder.in_state(Player::Off).on(Button::Power).goto(Player::On);
    builder.with_initial_state(Player::Off);
    let machine = builder.build().unwrap().create_passive_state_machine("small");

    let mut checkpoint = Checkpoint::<Player, Button, u8>::new("small");
    checkpoint.current_state = Some(Player::Paused);

    assert!(matches!(
        machine.load(&mut checkpoint),
        Err(StateMachineError::UnknownState(_))
    ));
}

#[test]
fn load_surfaces_loader_failures() {
    struct Unreachable;

    impl StateMachineLoader<Player, Button, u8> for Unreachable {
        fn load_current_state(&mut self) -> Result<Option<Player>, CheckpointError> {
            Err(CheckpointError::Storage("disk offline".to_string()))
        }

        fn load_history_states(&mut self) -> Result<HistoryStates<Player>, CheckpointError> {
            Ok(HistoryStates::new())
        }

        fn load_events(&mut self) -> Result<Vec<EventInformation<Button, u8>>, CheckpointError> {
            Ok(Vec::new())
        }

        fn load_priority_events(
            &mut self,
        ) -> Result<Vec<EventInformation<Button, u8>>, CheckpointError> {
            Ok(Vec::new())
        }
    }

    let machine = definition().create_passive_state_machine("player");
    let error = machine.load(&mut Unreachable).unwrap_err();

    assert_eq!(error.to_string(), "Checkpoint storage failed: disk offline");
}

#[test]
fn binary_checkpoint_restores_machine() {
    let machine = running();
    machine.fire(Button::Power).unwrap();
    machine.fire(Button::Play).unwrap();
    let mut checkpoint = Checkpoint::new("player");
    machine.save(&mut checkpoint).unwrap();

    let mut restored_checkpoint: Checkpoint<Player, Button, u8> =
        Checkpoint::from_bytes(&checkpoint.to_bytes().unwrap()).unwrap();
    let restored = definition().create_passive_state_machine("player");
    restored.load(&mut restored_checkpoint).unwrap();

    assert_eq!(restored.current_state(), Some(Player::Playing));
}

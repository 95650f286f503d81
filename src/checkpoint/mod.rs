//! Saving and restoring state machines.
//!
//! A machine persists through the [`StateMachineSaver`] and
//! [`StateMachineLoader`] traits. [`Checkpoint`] implements both and can be
//! written as JSON or as a compact binary blob, so a machine survives a
//! process restart with its current state, history and queued events.

use crate::core::{EventInformation, HistoryEntry, HistoryStates, StateId};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Receives the state of a machine during `save`.
pub trait StateMachineSaver<S: StateId, E, A> {
    fn save_current_state(&mut self, current_state: Option<&S>) -> Result<(), CheckpointError>;

    fn save_history_states(&mut self, history: &HistoryStates<S>) -> Result<(), CheckpointError>;

    fn save_events(&mut self, events: &[EventInformation<E, A>]) -> Result<(), CheckpointError>;

    fn save_priority_events(
        &mut self,
        events: &[EventInformation<E, A>],
    ) -> Result<(), CheckpointError>;
}

/// Supplies the state of a machine during `load`.
pub trait StateMachineLoader<S: StateId, E, A> {
    fn load_current_state(&mut self) -> Result<Option<S>, CheckpointError>;

    fn load_history_states(&mut self) -> Result<HistoryStates<S>, CheckpointError>;

    fn load_events(&mut self) -> Result<Vec<EventInformation<E, A>>, CheckpointError>;

    fn load_priority_events(&mut self) -> Result<Vec<EventInformation<E, A>>, CheckpointError>;
}

/// Serializable snapshot of a state machine.
/// Does NOT include guards or actions (not serializable).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, E: Serialize, A: Serialize",
    deserialize = "S: Deserialize<'de>, E: Deserialize<'de>, A: Deserialize<'de>"
))]
pub struct Checkpoint<S, E, A> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When the checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the saved machine
    pub machine: String,

    /// Active leaf state, `None` if the machine never entered its initial state
    pub current_state: Option<S>,

    /// Last active sub-state per super-state
    pub history: Vec<HistoryEntry<S>>,

    /// Queued normal events, oldest first
    pub events: Vec<EventInformation<E, A>>,

    /// Queued priority events in drain order
    pub priority_events: Vec<EventInformation<E, A>>,
}

impl<S, E, A> Checkpoint<S, E, A> {
    /// An empty checkpoint, ready to be filled by a machine's `save`.
    pub fn new(machine: impl Into<String>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            machine: machine.into(),
            current_state: None,
            history: Vec::new(),
            events: Vec::new(),
            priority_events: Vec::new(),
        }
    }

    fn check_version(self) -> Result<Self, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(self)
    }
}

impl<S, E, A> Checkpoint<S, E, A>
where
    S: Serialize,
    E: Serialize,
    A: Serialize,
{
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }
}

impl<S, E, A> Checkpoint<S, E, A>
where
    S: DeserializeOwned,
    E: DeserializeOwned,
    A: DeserializeOwned,
{
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }
}

impl<S, E, A> StateMachineSaver<S, E, A> for Checkpoint<S, E, A>
where
    S: StateId,
    E: Clone,
    A: Clone,
{
    fn save_current_state(&mut self, current_state: Option<&S>) -> Result<(), CheckpointError> {
        self.current_state = current_state.cloned();
        Ok(())
    }

    fn save_history_states(&mut self, history: &HistoryStates<S>) -> Result<(), CheckpointError> {
        self.history = history.entries();
        Ok(())
    }

    fn save_events(&mut self, events: &[EventInformation<E, A>]) -> Result<(), CheckpointError> {
        self.events = events.to_vec();
        Ok(())
    }

    fn save_priority_events(
        &mut self,
        events: &[EventInformation<E, A>],
    ) -> Result<(), CheckpointError> {
        self.priority_events = events.to_vec();
        Ok(())
    }
}

impl<S, E, A> StateMachineLoader<S, E, A> for Checkpoint<S, E, A>
where
    S: StateId,
    E: Clone,
    A: Clone,
{
    fn load_current_state(&mut self) -> Result<Option<S>, CheckpointError> {
        Ok(self.current_state.clone())
    }

    /// Fails if a super-state appears more than once.
    fn load_history_states(&mut self) -> Result<HistoryStates<S>, CheckpointError> {
        let mut seen = HashSet::new();
        for entry in &self.history {
            if !seen.insert(&entry.super_state) {
                return Err(CheckpointError::ValidationFailed(format!(
                    "duplicate history entry for {:?}",
                    entry.super_state
                )));
            }
        }
        Ok(self.history.iter().cloned().collect())
    }

    fn load_events(&mut self) -> Result<Vec<EventInformation<E, A>>, CheckpointError> {
        Ok(self.events.clone())
    }

    fn load_priority_events(&mut self) -> Result<Vec<EventInformation<E, A>>, CheckpointError> {
        Ok(self.priority_events.clone())
    }
}

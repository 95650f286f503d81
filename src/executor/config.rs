//! Configuration of the dedicated-thread executor.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for [`ActiveStateMachine`](crate::executor::ActiveStateMachine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveConfig {
    /// Name given to the worker thread
    pub thread_name: String,

    /// How long `stop` waits for the worker to finish its current event
    pub stop_timeout: Duration,
}

impl Default for ActiveConfig {
    fn default() -> Self {
        Self {
            thread_name: "statetree-worker".to_string(),
            stop_timeout: Duration::from_secs(10),
        }
    }
}

impl ActiveConfig {
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }
}

//! Executor processing events on the thread that fires them.

use crate::core::{EventArgument, EventId, EventInformation, MachineDefinition, StateId};
use crate::engine::{StateMachine, StateMachineError};
use crate::executor::macros::executor_surface;
use crate::executor::queue::{queue_event, EventQueues};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

struct PassiveInner<S: StateId, E: EventId, A: EventArgument> {
    machine: StateMachine<S, E, A>,
    queues: Mutex<EventQueues<E, A>>,
    running: AtomicBool,
    executing: AtomicBool,
}

/// Synchronous, reentrant executor.
///
/// `fire` processes the queue before it returns. An action that fires
/// another event only queues it; the outer drain loop picks it up once the
/// current transition has completed, so transitions never nest.
///
/// The handle is cheap to clone; clones drive the same machine.
pub struct PassiveStateMachine<S: StateId, E: EventId, A: EventArgument = ()> {
    inner: Arc<PassiveInner<S, E, A>>,
}

executor_surface!(PassiveStateMachine);

/// Clears the executing flag when the drain loop exits, even by panic.
struct Executing<'a>(&'a AtomicBool);

impl Drop for Executing<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: StateId, E: EventId, A: EventArgument> PassiveStateMachine<S, E, A> {
    pub fn new(name: impl Into<String>, definition: MachineDefinition<S, E, A>) -> Self {
        Self {
            inner: Arc::new(PassiveInner {
                machine: StateMachine::new(name, definition),
                queues: Mutex::new(EventQueues::new()),
                running: AtomicBool::new(false),
                executing: AtomicBool::new(false),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Start processing events, entering the initial state if it is still
    /// pending. Starting a running machine does nothing.
    pub fn start(&self) -> Result<(), StateMachineError> {
        if !self.inner.machine.is_initialized() {
            return Err(StateMachineError::NotInitialized);
        }
        if self.inner.running.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let name = self.inner.machine.name();
        self.inner
            .machine
            .extensions()
            .for_each(|extension| extension.started(name));
        debug!(machine = name, "Passive state machine started");
        self.execute()
    }

    /// Stop processing. Queued events are kept and processed on the next
    /// `start`. A drain in progress stops after its current event.
    pub fn stop(&self) {
        if !self.inner.running.swap(false, Ordering::AcqRel) {
            return;
        }

        let name = self.inner.machine.name();
        self.inner
            .machine
            .extensions()
            .for_each(|extension| extension.stopped(name));
        debug!(machine = name, "Passive state machine stopped");
    }

    fn enqueue(&self, event: EventInformation<E, A>, priority: bool) -> Result<(), StateMachineError> {
        queue_event(&self.inner.machine, &self.inner.queues, event, priority)?;
        self.execute()
    }

    /// Drain the queues unless stopped or already draining further up the
    /// call stack.
    fn execute(&self) -> Result<(), StateMachineError> {
        let inner = &self.inner;
        loop {
            if !inner.running.load(Ordering::Acquire) {
                return Ok(());
            }
            if inner
                .executing
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Ok(());
            }

            {
                let _executing = Executing(&inner.executing);
                self.drain()?;
            }

            // Another thread may have queued an event after the drain loop
            // saw empty queues but before the flag was cleared.
            if inner.queues.lock().is_empty() {
                return Ok(());
            }
        }
    }

    fn drain(&self) -> Result<(), StateMachineError> {
        let inner = &self.inner;
        inner.machine.enter_initial_state_if_pending()?;

        while inner.running.load(Ordering::Acquire) {
            let Some(next) = inner.queues.lock().pop() else {
                break;
            };
            inner.machine.fire(next.event, next.argument)?;
        }
        Ok(())
    }
}

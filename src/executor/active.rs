//! Executor processing events on a dedicated worker thread.

use crate::core::{EventArgument, EventId, EventInformation, MachineDefinition, StateId};
use crate::engine::{StateMachine, StateMachineError};
use crate::executor::config::ActiveConfig;
use crate::executor::macros::executor_surface;
use crate::executor::queue::{queue_event, EventQueues};
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

struct ActiveInner<S: StateId, E: EventId, A: EventArgument> {
    machine: StateMachine<S, E, A>,
    queues: Mutex<EventQueues<E, A>>,
    wake: Condvar,
    config: ActiveConfig,
    worker: Mutex<Option<Worker>>,
    /// Held while a worker resolves an event. A worker detached by a timed
    /// out `stop` keeps it until its event is done.
    processing: Mutex<()>,
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<Result<(), StateMachineError>>,
    finished: Receiver<()>,
    thread: ThreadId,
}

/// Executor owning one worker thread.
///
/// `fire` queues the event and returns immediately; the worker processes
/// events one at a time. A guard or action failure nobody listens for stops
/// the worker, and the failure is returned by the next `stop`.
///
/// The worker holds a handle to the machine until `stop` is called. A
/// worker left behind by a timed out `stop` finishes its current event
/// before a restarted worker resolves the next one.
pub struct ActiveStateMachine<S: StateId, E: EventId, A: EventArgument = ()> {
    inner: Arc<ActiveInner<S, E, A>>,
}

executor_surface!(ActiveStateMachine);

impl<S: StateId, E: EventId, A: EventArgument> ActiveStateMachine<S, E, A> {
    pub fn new(
        name: impl Into<String>,
        definition: MachineDefinition<S, E, A>,
        config: ActiveConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ActiveInner {
                machine: StateMachine::new(name, definition),
                queues: Mutex::new(EventQueues::new()),
                wake: Condvar::new(),
                config,
                worker: Mutex::new(None),
                processing: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &ActiveConfig {
        &self.inner.config
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .worker
            .lock()
            .as_ref()
            .is_some_and(|worker| !worker.cancel.is_cancelled() && !worker.handle.is_finished())
    }

    /// Spawn the worker thread. The initial state, if still pending, is
    /// entered on the worker. Starting a running machine does nothing.
    pub fn start(&self) -> Result<(), StateMachineError> {
        if !self.inner.machine.is_initialized() {
            return Err(StateMachineError::NotInitialized);
        }

        let mut slot = self.inner.worker.lock();
        if let Some(worker) = slot.as_ref() {
            if !worker.cancel.is_cancelled() && !worker.handle.is_finished() {
                return Ok(());
            }
        }
        if let Some(previous) = slot.take() {
            if previous.thread == thread::current().id() {
                // Restarted from an action on the worker: it exits once that
                // action returns and the new worker waits for it.
                debug!(machine = self.name(), "Replacing the worker from its own thread");
            } else if let Err(error) = Self::join(previous) {
                warn!(machine = self.name(), %error, "Previous worker ended with an error");
            }
        }

        let cancel = CancellationToken::new();
        let (done, finished) = channel::bounded::<()>(1);
        let inner = Arc::clone(&self.inner);
        let token = cancel.clone();
        let handle = thread::Builder::new()
            .name(self.inner.config.thread_name.clone())
            .spawn(move || {
                let _done = done;
                run_worker(&inner, &token)
            })
            .map_err(|e| StateMachineError::WorkerSpawnFailed(e.to_string()))?;

        *slot = Some(Worker {
            cancel,
            thread: handle.thread().id(),
            handle,
            finished,
        });
        drop(slot);

        let name = self.name();
        self.inner
            .machine
            .extensions()
            .for_each(|extension| extension.started(name));
        debug!(machine = name, thread = %self.inner.config.thread_name, "Active state machine started");
        Ok(())
    }

    /// Stop the worker after its current event and wait for it, at most
    /// `stop_timeout`. Returns the failure that stopped the worker, if any.
    ///
    /// Called from an action running on the worker itself, this only
    /// requests the stop.
    pub fn stop(&self) -> Result<(), StateMachineError> {
        let mut slot = self.inner.worker.lock();
        let Some(worker) = slot.as_ref() else {
            return Ok(());
        };

        worker.cancel.cancel();
        self.wake_worker();
        if worker.thread == thread::current().id() {
            return Ok(());
        }
        let Some(worker) = slot.take() else {
            return Ok(());
        };
        drop(slot);

        let result = match worker.finished.recv_timeout(self.inner.config.stop_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Self::join(worker),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    machine = self.name(),
                    timeout = ?self.inner.config.stop_timeout,
                    "Worker did not stop in time"
                );
                Err(StateMachineError::StopTimedOut)
            }
        };

        let name = self.name();
        self.inner
            .machine
            .extensions()
            .for_each(|extension| extension.stopped(name));
        debug!(machine = name, "Active state machine stopped");
        result
    }

    fn join(worker: Worker) -> Result<(), StateMachineError> {
        worker
            .handle
            .join()
            .map_err(|_| StateMachineError::WorkerPanicked)?
    }

    fn enqueue(&self, event: EventInformation<E, A>, priority: bool) -> Result<(), StateMachineError> {
        queue_event(&self.inner.machine, &self.inner.queues, event, priority)?;
        self.wake_worker();
        Ok(())
    }

    fn wake_worker(&self) {
        // Taking the queue lock orders the wake-up after the worker's check.
        let _queues = self.inner.queues.lock();
        self.inner.wake.notify_all();
    }
}

fn run_worker<S: StateId, E: EventId, A: EventArgument>(
    inner: &ActiveInner<S, E, A>,
    cancel: &CancellationToken,
) -> Result<(), StateMachineError> {
    {
        let _processing = inner.processing.lock();
        inner.machine.enter_initial_state_if_pending()?;
    }

    loop {
        let next = {
            let mut queues = inner.queues.lock();
            loop {
                if cancel.is_cancelled() {
                    return Ok(());
                }
                if let Some(next) = queues.pop() {
                    break next;
                }
                inner.wake.wait(&mut queues);
            }
        };

        let _processing = inner.processing.lock();
        // Stopped while waiting for a detached worker to finish.
        if cancel.is_cancelled() {
            inner.queues.lock().push_priority(next);
            return Ok(());
        }
        if let Err(error) = inner.machine.fire(next.event, next.argument) {
            warn!(machine = inner.machine.name(), %error, "Worker stopped by an unhandled failure");
            return Err(error);
        }
    }
}

//! Executor processing events on a Tokio task.

use crate::core::{EventArgument, EventId, EventInformation, MachineDefinition, StateId};
use crate::engine::{StateMachine, StateMachineError};
use crate::executor::macros::executor_surface;
use crate::executor::queue::{queue_event, EventQueues};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

struct AsyncInner<S: StateId, E: EventId, A: EventArgument> {
    machine: StateMachine<S, E, A>,
    queues: Mutex<EventQueues<E, A>>,
    wake: Notify,
    worker: Mutex<Option<AsyncWorker>>,
    /// Held while a task resolves an event, so a task left running by a
    /// dropped `stop` future never overlaps its successor.
    processing: tokio::sync::Mutex<()>,
}

struct AsyncWorker {
    cancel: CancellationToken,
    handle: JoinHandle<Result<(), StateMachineError>>,
}

/// Executor running a Tokio task that drains the queues.
///
/// `fire` never blocks and may be called from synchronous code, including
/// actions. Guards and actions run on the task and should not block for long.
pub struct AsyncStateMachine<S: StateId, E: EventId, A: EventArgument = ()> {
    inner: Arc<AsyncInner<S, E, A>>,
}

executor_surface!(AsyncStateMachine);

impl<S: StateId, E: EventId, A: EventArgument> AsyncStateMachine<S, E, A> {
    pub fn new(name: impl Into<String>, definition: MachineDefinition<S, E, A>) -> Self {
        Self {
            inner: Arc::new(AsyncInner {
                machine: StateMachine::new(name, definition),
                queues: Mutex::new(EventQueues::new()),
                wake: Notify::new(),
                worker: Mutex::new(None),
                processing: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .worker
            .lock()
            .as_ref()
            .is_some_and(|worker| !worker.cancel.is_cancelled() && !worker.handle.is_finished())
    }

    /// Spawn the worker task on the current Tokio runtime.
    pub fn start(&self) -> Result<(), StateMachineError> {
        if !self.inner.machine.is_initialized() {
            return Err(StateMachineError::NotInitialized);
        }
        let runtime = Handle::try_current().map_err(|_| StateMachineError::NoAsyncRuntime)?;

        let mut slot = self.inner.worker.lock();
        if let Some(worker) = slot.as_ref() {
            if !worker.cancel.is_cancelled() && !worker.handle.is_finished() {
                return Ok(());
            }
        }
        if let Some(previous) = slot.take() {
            runtime.spawn(reap_worker(self.name().to_string(), previous.handle));
        }

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run_worker(Arc::clone(&self.inner), cancel.clone()));
        *slot = Some(AsyncWorker { cancel, handle });
        drop(slot);

        let name = self.name();
        self.inner
            .machine
            .extensions()
            .for_each(|extension| extension.started(name));
        debug!(machine = name, "Async state machine started");
        Ok(())
    }

    /// Cancel the worker and wait for it to finish its current event.
    /// Returns the failure that stopped the worker, if any.
    pub async fn stop(&self) -> Result<(), StateMachineError> {
        let worker = self.inner.worker.lock().take();
        let Some(worker) = worker else {
            return Ok(());
        };
        worker.cancel.cancel();

        let result = match worker.handle.await {
            Ok(result) => result,
            Err(error) if error.is_cancelled() => Ok(()),
            Err(_) => Err(StateMachineError::WorkerPanicked),
        };

        let name = self.name();
        self.inner
            .machine
            .extensions()
            .for_each(|extension| extension.stopped(name));
        debug!(machine = name, "Async state machine stopped");
        result
    }

    fn enqueue(&self, event: EventInformation<E, A>, priority: bool) -> Result<(), StateMachineError> {
        queue_event(&self.inner.machine, &self.inner.queues, event, priority)?;
        self.inner.wake.notify_one();
        Ok(())
    }
}

async fn run_worker<S: StateId, E: EventId, A: EventArgument>(
    inner: Arc<AsyncInner<S, E, A>>,
    cancel: CancellationToken,
) -> Result<(), StateMachineError> {
    {
        let _processing = inner.processing.lock().await;
        inner.machine.enter_initial_state_if_pending()?;
    }

    loop {
        if cancel.is_cancelled() {
            return Ok(());
        }

        let next = inner.queues.lock().pop();
        match next {
            Some(next) => {
                let processing = inner.processing.lock().await;
                if cancel.is_cancelled() {
                    inner.queues.lock().push_priority(next);
                    return Ok(());
                }
                if let Err(error) = inner.machine.fire(next.event, next.argument) {
                    warn!(machine = inner.machine.name(), %error, "Worker stopped by an unhandled failure");
                    return Err(error);
                }
                drop(processing);
                tokio::task::yield_now().await;
            }
            None => {
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    _ = inner.wake.notified() => {}
                }
            }
        }
    }
}

/// Log how a worker that ended without `stop` finished.
async fn reap_worker(machine: String, handle: JoinHandle<Result<(), StateMachineError>>) {
    match handle.await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => warn!(machine = %machine, %error, "Previous worker ended with an error"),
        Err(error) if error.is_cancelled() => {}
        Err(_) => warn!(machine = %machine, "Previous worker panicked"),
    }
}

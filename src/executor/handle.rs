//! Future-style handles to tasks running on a [`ThreadPool`].
//!
//! A task moves from `Pending` to exactly one of `Completed` or `Faulted`
//! and never leaves that state:
//!
//! ```text
//! Pending -> Completed(value)
//!    |
//!    +-----> Faulted(fault)
//! ```
//!
//! Continuations registered while a task is pending are queued on the task
//! and handed to the pool, in registration order, when it reaches a terminal
//! state.
//!
//! [`ThreadPool`]: crate::ThreadPool

use super::pool::Shared;
use super::task::{TaskId, Thunk};
use crate::error::{BoxError, Error, Fault, Result};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::mem;
use std::sync::Arc;

enum State<R> {
    Pending { continuations: Vec<Thunk> },
    Completed(R),
    Faulted(Fault),
}

impl<R> State<R> {
    fn is_pending(&self) -> bool {
        matches!(self, State::Pending { .. })
    }

    fn name(&self) -> &'static str {
        match self {
            State::Pending { .. } => "Pending",
            State::Completed(_) => "Completed",
            State::Faulted(_) => "Faulted",
        }
    }
}

impl<R: Clone> State<R> {
    fn outcome(&self) -> Option<Result<R>> {
        match self {
            State::Pending { .. } => None,
            State::Completed(value) => Some(Ok(value.clone())),
            State::Faulted(fault) => Some(Err(Error::Deferred(fault.clone()))),
        }
    }
}

struct TaskInner<R> {
    id: TaskId,
    state: Mutex<State<R>>,
    completed: Condvar,
    pool: Arc<Shared>,
}

/// Handle to the eventual outcome of a submitted computation.
///
/// Clones refer to the same task.
pub struct TaskHandle<R> {
    inner: Arc<TaskInner<R>>,
}

// Manual Clone implementation that doesn't require R: Clone
impl<R> Clone for TaskHandle<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Send + 'static> TaskHandle<R> {
    /// Create a pending task and the thunk that will run it.
    pub(crate) fn spawn<F>(pool: &Arc<Shared>, computation: F) -> (Self, Thunk)
    where
        F: FnOnce() -> std::result::Result<R, Fault> + Send + 'static,
    {
        let handle = TaskHandle {
            inner: Arc::new(TaskInner {
                id: TaskId::next(),
                state: Mutex::new(State::Pending {
                    continuations: Vec::new(),
                }),
                completed: Condvar::new(),
                pool: pool.clone(),
            }),
        };

        let task = handle.clone();
        let thunk = Thunk::new(handle.id(), move || task.run(computation));
        (handle, thunk)
    }

    /// Runs the computation with no lock held, then publishes the outcome,
    /// wakes readers and releases continuations in one critical section.
    fn run<F>(self, computation: F)
    where
        F: FnOnce() -> std::result::Result<R, Fault>,
    {
        let pool = &self.inner.pool;

        let outcome = match pool.panic_handler.execute(computation) {
            Ok(Ok(value)) => State::Completed(value),
            Ok(Err(fault)) => State::Faulted(fault),
            Err(panic) => State::Faulted(Fault::from_panic(panic.message)),
        };

        if let State::Faulted(fault) = &outcome {
            pool.metrics.record_task_faulted();
            tracing::debug!(task = %self.inner.id, error = %fault.cause(), "task faulted");
        }

        let mut state = self.inner.state.lock();
        let previous = mem::replace(&mut *state, outcome);
        self.inner.completed.notify_all();

        if let State::Pending { continuations } = previous {
            for continuation in continuations {
                tracing::trace!(
                    task = %self.inner.id,
                    continuation = %continuation.task,
                    "releasing continuation"
                );
                pool.metrics.record_continuation_scheduled();
                pool.submit_continuation(continuation);
            }
        }
    }
}

impl<R> TaskHandle<R> {
    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    /// True once the task has completed or faulted. Never blocks.
    pub fn is_completed(&self) -> bool {
        !self.inner.state.lock().is_pending()
    }
}

impl<R: Clone + Send + 'static> TaskHandle<R> {
    /// Block until the task finishes and return its value.
    ///
    /// A faulted task yields [`Error::Deferred`] whose source chain ends at
    /// the error the computation raised. Waiting on a task from inside the
    /// same pool can deadlock if every worker ends up waiting.
    pub fn result(&self) -> Result<R> {
        let mut state = self.inner.state.lock();
        loop {
            if let Some(outcome) = state.outcome() {
                return outcome;
            }
            self.inner.completed.wait(&mut state);
        }
    }

    /// The outcome if the task has finished, `None` while it is pending.
    pub fn try_result(&self) -> Option<Result<R>> {
        self.inner.state.lock().outcome()
    }

    /// Schedule `f` to run on the pool with this task's value.
    ///
    /// Returns the downstream handle immediately. If this task faults, the
    /// downstream task faults too, with this task's error as its cause.
    /// Fails with [`Error::ShutDown`] once the pool has begun shutting down.
    pub fn continue_with<U, F>(&self, f: F) -> Result<TaskHandle<U>>
    where
        U: Send + 'static,
        F: FnOnce(R) -> U + Send + 'static,
    {
        self.chain(move |value| Ok(f(value)))
    }

    /// Like [`continue_with`](Self::continue_with), for continuations that
    /// can fail.
    pub fn continue_with_fallible<U, E, F>(&self, f: F) -> Result<TaskHandle<U>>
    where
        U: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce(R) -> std::result::Result<U, E> + Send + 'static,
    {
        self.chain(move |value| f(value).map_err(|e| Fault::from_boxed(e.into())))
    }

    fn chain<U, F>(&self, f: F) -> Result<TaskHandle<U>>
    where
        U: Send + 'static,
        F: FnOnce(R) -> std::result::Result<U, Fault> + Send + 'static,
    {
        let upstream = self.clone();
        let (downstream, thunk) = TaskHandle::spawn(&self.inner.pool, move || {
            // Only scheduled once `upstream` is terminal, so this never blocks.
            let value = upstream.result().map_err(Fault::new)?;
            f(value)
        });

        let pool = &self.inner.pool;
        let mut state = self.inner.state.lock();
        match &mut *state {
            State::Pending { continuations } => {
                if pool.is_shutdown() {
                    return Err(Error::ShutDown);
                }
                tracing::trace!(
                    task = %self.inner.id,
                    continuation = %downstream.id(),
                    "deferring continuation"
                );
                continuations.push(thunk);
            }
            State::Completed(_) | State::Faulted(_) => {
                pool.submit(thunk)?;
                pool.metrics.record_continuation_scheduled();
            }
        }

        Ok(downstream)
    }
}

impl<R> fmt::Debug for TaskHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.inner.id)
            .field("state", &self.inner.state.lock().name())
            .finish()
    }
}

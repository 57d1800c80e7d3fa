use super::handle::TaskHandle;
use super::panic_handler::PanicHandler;
use super::task::Thunk;
use super::worker::{Worker, WorkerId, WorkerState};
use crate::config::Config;
use crate::error::{BoxError, Error, Fault, Result};
use crate::telemetry::{Metrics, MetricsSnapshot};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

/// Fixed-size pool of worker threads fed from one unbounded FIFO queue.
///
/// Dropping the pool shuts it down.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<WorkerHandle>>,
    worker_threads: Vec<ThreadId>,
    num_threads: usize,
}

struct WorkerHandle {
    id: WorkerId,
    thread: Option<JoinHandle<()>>,
    state: Arc<WorkerState>,
}

/// State shared by the pool, its workers and every task handle it created.
pub(crate) struct Shared {
    queue: Mutex<QueueState>,
    available: Condvar,
    pub(crate) metrics: Metrics,
    pub(crate) panic_handler: PanicHandler,
}

struct QueueState {
    thunks: VecDeque<Thunk>,
    // Thunks dequeued by a worker and not yet finished.
    running: usize,
    shutdown: bool,
}

impl Shared {
    fn new(config: &Config) -> Self {
        Self {
            queue: Mutex::new(QueueState {
                thunks: VecDeque::new(),
                running: 0,
                shutdown: false,
            }),
            available: Condvar::new(),
            metrics: Metrics::new(),
            panic_handler: PanicHandler::new(config.panic_strategy),
        }
    }

    /// Enqueue a top-level thunk. Rejected once shutdown has begun.
    pub(crate) fn submit(&self, thunk: Thunk) -> Result<()> {
        let mut queue = self.queue.lock();
        if queue.shutdown {
            return Err(Error::ShutDown);
        }
        queue.thunks.push_back(thunk);
        self.available.notify_one();
        Ok(())
    }

    /// Enqueue a continuation released by a completing task.
    ///
    /// Accepted after shutdown: workers keep running until the queue is empty
    /// and nothing is running, so a drained continuation always executes.
    pub(crate) fn submit_continuation(&self, thunk: Thunk) {
        let mut queue = self.queue.lock();
        queue.thunks.push_back(thunk);
        self.available.notify_one();
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.queue.lock().shutdown
    }

    /// Returns true for the call that flipped the flag.
    fn begin_shutdown(&self) -> bool {
        let mut queue = self.queue.lock();
        let first = !queue.shutdown;
        queue.shutdown = true;
        self.available.notify_all();
        first
    }

    /// Blocks until a thunk is available. Returns `None` once shutdown has
    /// been requested and all work, including work still running, is done.
    pub(crate) fn next_thunk(&self) -> Option<Thunk> {
        let mut queue = self.queue.lock();
        loop {
            if let Some(thunk) = queue.thunks.pop_front() {
                queue.running += 1;
                return Some(thunk);
            }
            if queue.shutdown && queue.running == 0 {
                return None;
            }
            self.available.wait(&mut queue);
        }
    }

    pub(crate) fn finish_thunk(&self) {
        let mut queue = self.queue.lock();
        queue.running -= 1;
        if queue.shutdown && queue.running == 0 && queue.thunks.is_empty() {
            self.available.notify_all();
        }
    }

    fn queued(&self) -> usize {
        self.queue.lock().thunks.len()
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.lock();
        f.debug_struct("Shared")
            .field("queued", &queue.thunks.len())
            .field("running", &queue.running)
            .field("shutdown", &queue.shutdown)
            .finish()
    }
}

impl ThreadPool {
    /// Create a pool with exactly `num_threads` workers and default settings.
    ///
    /// Fails with [`Error::Config`] if `num_threads` is zero.
    pub fn new(num_threads: usize) -> Result<Self> {
        let config = Config::builder().num_threads(num_threads).build()?;
        Self::with_config(&config)
    }

    /// Create a pool from a full [`Config`].
    ///
    /// Fails with [`Error::Config`] if the config is invalid, or with
    /// [`Error::Io`] if a worker thread cannot be spawned; workers already
    /// started are shut down and joined first.
    pub fn with_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();

        let shared = Arc::new(Shared::new(config));
        let mut handles: Vec<WorkerHandle> = Vec::with_capacity(num_threads);

        for id in 0..num_threads {
            let worker = Worker::new(id);
            let state = worker.state.clone();
            let shared_clone = shared.clone();
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);

            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            match builder.spawn(move || worker.run(shared_clone)) {
                Ok(thread) => handles.push(WorkerHandle {
                    id,
                    thread: Some(thread),
                    state,
                }),
                Err(e) => {
                    tracing::error!(worker = id, error = %e, "failed to spawn worker thread");
                    shared.begin_shutdown();
                    for handle in handles.iter_mut() {
                        if let Some(thread) = handle.thread.take() {
                            let _ = thread.join();
                        }
                    }
                    return Err(Error::Io(e));
                }
            }
        }

        let worker_threads = handles
            .iter()
            .filter_map(|h| h.thread.as_ref().map(|t| t.thread().id()))
            .collect();

        tracing::debug!(workers = num_threads, "thread pool started");

        Ok(Self {
            shared,
            workers: Mutex::new(handles),
            worker_threads,
            num_threads,
        })
    }

    /// Queue `f` for execution and return its handle without blocking.
    ///
    /// A panic inside `f` is captured as the task's fault.
    pub fn submit<R, F>(&self, f: F) -> Result<TaskHandle<R>>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        self.spawn_task(move || Ok(f()))
    }

    /// Like [`submit`](Self::submit), for computations that can fail. An
    /// `Err` becomes the task's fault and the root cause seen by readers.
    pub fn submit_fallible<R, E, F>(&self, f: F) -> Result<TaskHandle<R>>
    where
        R: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> std::result::Result<R, E> + Send + 'static,
    {
        self.spawn_task(move || f().map_err(|e| Fault::from_boxed(e.into())))
    }

    fn spawn_task<R, F>(&self, computation: F) -> Result<TaskHandle<R>>
    where
        R: Send + 'static,
        F: FnOnce() -> std::result::Result<R, Fault> + Send + 'static,
    {
        let (handle, thunk) = TaskHandle::spawn(&self.shared, computation);
        self.shared.submit(thunk)?;
        self.shared.metrics.record_task_submitted();
        Ok(handle)
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.is_shutdown()
    }

    /// Thunks waiting in the queue, not counting the ones being executed.
    pub fn queued_tasks(&self) -> usize {
        self.shared.queued()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared
            .metrics
            .snapshot(self.shared.panic_handler.panic_count())
    }

    /// Tasks executed by each worker, indexed by worker id.
    pub fn worker_tasks_executed(&self) -> Vec<u64> {
        self.workers
            .lock()
            .iter()
            .map(|w| w.state.tasks_executed.load(Ordering::Relaxed))
            .collect()
    }

    /// Stop accepting submissions, let queued work and in-flight
    /// continuation chains drain, and join every worker.
    ///
    /// Calling it again is a no-op. When called from one of this pool's own
    /// workers it only signals shutdown, since joining would wait on itself.
    pub fn shutdown(&self) {
        if self.shared.begin_shutdown() {
            tracing::debug!(workers = self.num_threads, "shutting down thread pool");
        }

        if self.worker_threads.contains(&thread::current().id()) {
            tracing::warn!("shutdown called from a pool worker; not joining workers");
            return;
        }

        let mut workers = self.workers.lock();
        for worker in workers.iter_mut() {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    tracing::warn!(worker = worker.id, "worker thread panicked");
                }
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("num_threads", &self.num_threads)
            .field("shared", &self.shared)
            .finish()
    }
}

// worker thread stuff
use super::pool::Shared;
use super::task::Thunk;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub type WorkerId = usize;

// stats for each worker
#[derive(Debug)]
pub(crate) struct WorkerState {
    pub tasks_executed: AtomicU64,
}

impl WorkerState {
    fn new() -> Self {
        Self {
            tasks_executed: AtomicU64::new(0),
        }
    }
}

pub(crate) struct Worker {
    pub id: WorkerId,
    pub state: Arc<WorkerState>,
}

impl Worker {
    pub fn new(id: WorkerId) -> Self {
        Self {
            id,
            state: Arc::new(WorkerState::new()),
        }
    }

    // main loop
    pub fn run(&self, shared: Arc<Shared>) {
        tracing::trace!(worker = self.id, "worker started");

        while let Some(thunk) = shared.next_thunk() {
            self.execute_thunk(&shared, thunk);
        }

        tracing::trace!(worker = self.id, "worker stopped");
    }

    fn execute_thunk(&self, shared: &Shared, thunk: Thunk) {
        let task = thunk.task;
        let start = Instant::now();

        // Task handles catch panics from user code themselves; this only
        // guards the worker against a failure in the bookkeeping around it.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            thunk.execute();
        }));

        shared
            .metrics
            .record_task_execution(start.elapsed().as_nanos() as u64);

        if result.is_err() {
            tracing::error!(worker = self.id, %task, "thunk panicked outside its task");
        }

        self.state.tasks_executed.fetch_add(1, Ordering::Relaxed);
        shared.finish_thunk();
    }
}

//! Units of work queued on the pool.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A ready-to-run execution closure for one task.
pub(crate) struct Thunk {
    pub(crate) task: TaskId,
    func: Box<dyn FnOnce() + Send + 'static>,
}

impl Thunk {
    pub fn new<F>(task: TaskId, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Thunk {
            task,
            func: Box::new(f),
        }
    }

    /// Execute the thunk
    pub fn execute(self) {
        (self.func)();
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk").field("task", &self.task).finish()
    }
}

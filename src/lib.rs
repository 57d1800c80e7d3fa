//! skein - a fixed-size thread pool with chainable task handles
//!
//! Submit closures to a [`ThreadPool`], get back a [`TaskHandle`], block on
//! its result or chain more work onto it with
//! [`continue_with`](TaskHandle::continue_with). Continuations run on the same
//! pool. The crate also provides memoizing lazy cells with single-threaded
//! ([`Lazy`]) and thread-safe ([`SyncLazy`]) evaluation.
//!
//! # Quick Start
//!
//! ```no_run
//! use skein::prelude::*;
//!
//! let pool = ThreadPool::new(4)?;
//!
//! let answer = pool.submit(|| 10)?;
//! let bumped = answer.continue_with(|x| x + 5)?;
//! assert_eq!(bumped.result()?, 15);
//!
//! pool.shutdown();
//! # Ok::<(), skein::Error>(())
//! ```
//!
//! # Failures
//!
//! A computation that panics, or that returns `Err` when submitted through
//! [`ThreadPool::submit_fallible`], leaves its task faulted. Reading the
//! result then returns [`Error::Deferred`]; continuations of a faulted task
//! fault as well, and [`Error::root_cause`] recovers the original error.
//!
//! # Shutdown
//!
//! [`ThreadPool::shutdown`] rejects new submissions, lets everything already
//! queued run, including continuation chains released while draining, and
//! joins the workers.

// Lint configuration
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod lazy;
pub mod prelude;
pub mod runtime;
pub mod telemetry;

// Re-export key types at crate root
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Fault, PanicError, Result};
pub use executor::{PanicStrategy, TaskHandle, TaskId, ThreadPool};
pub use lazy::{Lazy, LazyValue, SyncLazy};
pub use runtime::{init, init_with_config, shutdown, spawn};

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_lazy_shared_by_pool_tasks() {
        let pool = ThreadPool::new(4).unwrap();
        let calls = Arc::new(Mutex::new(0));

        let lazy = {
            let calls = calls.clone();
            Arc::new(SyncLazy::new(move || {
                *calls.lock() += 1;
                (1..=10).product::<u64>()
            }))
        };

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let lazy = lazy.clone();
                pool.submit(move || *lazy.get()).unwrap()
            })
            .collect();

        for task in tasks {
            assert_eq!(task.result().unwrap(), 3_628_800);
        }
        assert_eq!(*calls.lock(), 1);

        pool.shutdown();
    }

    #[test]
    fn test_chain_of_continuations() {
        let pool = ThreadPool::new(2).unwrap();

        let mut task = pool.submit(|| 1u64).unwrap();
        for _ in 0..10 {
            task = task.continue_with(|x| x * 2).unwrap();
        }

        assert_eq!(task.result().unwrap(), 1024);
        assert_eq!(pool.metrics().continuations_scheduled, 10);
    }
}

//! Telemetry for the thread pool.
//!
//! Lock-free counters updated by workers and task handles; read them through
//! [`ThreadPool::metrics`](crate::ThreadPool::metrics). Log events go through
//! the `tracing` macros and reach whatever subscriber the application installs.

pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};

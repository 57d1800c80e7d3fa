//! Counters for pool monitoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Pool metrics collector
#[derive(Debug)]
pub struct Metrics {
    // Task counters
    tasks_submitted: AtomicU64,
    tasks_executed: AtomicU64,
    tasks_faulted: AtomicU64,
    continuations_scheduled: AtomicU64,

    busy_time_ns: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_faulted: AtomicU64::new(0),
            continuations_scheduled: AtomicU64::new(0),
            busy_time_ns: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_task_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one executed thunk and the time spent running it
    pub fn record_task_execution(&self, duration_ns: u64) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
        self.busy_time_ns.fetch_add(duration_ns, Ordering::Relaxed);
    }

    pub fn record_task_faulted(&self) {
        self.tasks_faulted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_continuation_scheduled(&self) {
        self.continuations_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot. `tasks_panicked` comes from the pool's panic handler.
    pub fn snapshot(&self, tasks_panicked: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_faulted: self.tasks_faulted.load(Ordering::Relaxed),
            tasks_panicked,
            continuations_scheduled: self.continuations_scheduled.load(Ordering::Relaxed),
            busy_time: Duration::from_nanos(self.busy_time_ns.load(Ordering::Relaxed)),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the pool counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    /// Top-level submissions accepted by the pool.
    pub tasks_submitted: u64,
    /// Thunks run to completion by workers, continuations included.
    pub tasks_executed: u64,
    /// Tasks that ended in the faulted state.
    pub tasks_faulted: u64,
    /// Faulted tasks whose computation panicked.
    pub tasks_panicked: u64,
    pub continuations_scheduled: u64,
    pub busy_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();

        metrics.record_task_submitted();
        metrics.record_task_submitted();
        metrics.record_task_execution(1_000);
        metrics.record_task_execution(2_000);
        metrics.record_task_faulted();
        metrics.record_continuation_scheduled();

        let snapshot = metrics.snapshot(1);
        assert_eq!(snapshot.tasks_submitted, 2);
        assert_eq!(snapshot.tasks_executed, 2);
        assert_eq!(snapshot.tasks_faulted, 1);
        assert_eq!(snapshot.tasks_panicked, 1);
        assert_eq!(snapshot.continuations_scheduled, 1);
        assert_eq!(snapshot.busy_time, Duration::from_nanos(3_000));
    }
}

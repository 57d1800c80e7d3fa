use super::{LazyValue, POISONED};
use parking_lot::Mutex;
use std::fmt;
use std::sync::OnceLock;

/// Thread-safe lazy value.
///
/// Reads after initialization never lock. First access uses double-checked
/// locking, so concurrent first callers run the computation exactly once and
/// all observe the same value.
pub struct SyncLazy<T, F = fn() -> T> {
    value: OnceLock<T>,
    init: Mutex<Option<F>>,
}

impl<T, F: FnOnce() -> T> SyncLazy<T, F> {
    pub fn new(f: F) -> Self {
        Self {
            value: OnceLock::new(),
            init: Mutex::new(Some(f)),
        }
    }

    /// Returns the value, running the computation on the first call and
    /// dropping it afterwards.
    ///
    /// # Panics
    ///
    /// If an earlier call panicked inside the computation.
    pub fn get(&self) -> &T {
        if let Some(value) = self.value.get() {
            return value;
        }

        let mut init = self.init.lock();
        // Another caller may have finished while we waited for the lock.
        if let Some(value) = self.value.get() {
            return value;
        }

        let f = match init.take() {
            Some(f) => f,
            None => panic!("{}", POISONED),
        };
        let value = f();
        self.value.get_or_init(|| value)
    }

    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }

    /// The computed value, or `None` if it was never evaluated.
    pub fn into_inner(self) -> Option<T> {
        self.value.into_inner()
    }
}

impl<T, F: FnOnce() -> T> LazyValue<T> for SyncLazy<T, F> {
    fn get(&self) -> &T {
        SyncLazy::get(self)
    }

    fn is_evaluated(&self) -> bool {
        SyncLazy::is_evaluated(self)
    }
}

impl<T: fmt::Debug, F> fmt::Debug for SyncLazy<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("SyncLazy").field(value).finish(),
            None => f.write_str("SyncLazy(<uninit>)"),
        }
    }
}

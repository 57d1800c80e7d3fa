use super::{LazyValue, POISONED};
use std::cell::{Cell, OnceCell};
use std::fmt;

/// Single-threaded lazy value.
pub struct Lazy<T, F = fn() -> T> {
    value: OnceCell<T>,
    init: Cell<Option<F>>,
}

impl<T, F: FnOnce() -> T> Lazy<T, F> {
    pub fn new(f: F) -> Self {
        Self {
            value: OnceCell::new(),
            init: Cell::new(Some(f)),
        }
    }

    /// Returns the value, running the computation on the first call and
    /// dropping it afterwards.
    ///
    /// # Panics
    ///
    /// If an earlier call panicked inside the computation.
    pub fn get(&self) -> &T {
        self.value.get_or_init(|| match self.init.take() {
            Some(f) => f(),
            None => panic!("{}", POISONED),
        })
    }

    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }

    /// The computed value, or `None` if it was never evaluated.
    pub fn into_inner(self) -> Option<T> {
        self.value.into_inner()
    }
}

impl<T, F: FnOnce() -> T> LazyValue<T> for Lazy<T, F> {
    fn get(&self) -> &T {
        Lazy::get(self)
    }

    fn is_evaluated(&self) -> bool {
        Lazy::is_evaluated(self)
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Lazy<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("Lazy").field(value).finish(),
            None => f.write_str("Lazy(<uninit>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_computes_once() {
        let calls = Cell::new(0);
        let lazy = Lazy::new(|| {
            calls.set(calls.get() + 1);
            vec![1, 2, 3]
        });

        assert!(!lazy.is_evaluated());
        for _ in 0..10 {
            assert_eq!(lazy.get(), &vec![1, 2, 3]);
        }
        assert_eq!(calls.get(), 1);
        assert!(lazy.is_evaluated());
    }

    #[test]
    fn test_absent_value_is_cached() {
        let calls = Cell::new(0);
        let lazy: Lazy<Option<u32>, _> = Lazy::new(|| {
            calls.set(calls.get() + 1);
            None
        });

        assert_eq!(*lazy.get(), None);
        assert_eq!(*lazy.get(), None);
        assert!(lazy.is_evaluated());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_into_inner() {
        let lazy = Lazy::new(|| 5);
        assert_eq!(format!("{:?}", lazy), "Lazy(<uninit>)");
        lazy.get();
        assert_eq!(format!("{:?}", lazy), "Lazy(5)");
        assert_eq!(lazy.into_inner(), Some(5));

        let untouched = Lazy::new(|| 5);
        assert_eq!(untouched.into_inner(), None);
    }

    #[test]
    fn test_function_pointer_default() {
        fn answer() -> u8 {
            42
        }
        let lazy: Lazy<u8> = Lazy::new(answer);
        assert_eq!(*lazy.get(), 42);
    }

    #[test]
    fn test_poisoned_after_panic() {
        let lazy: Lazy<i32, _> = Lazy::new(|| -> i32 { panic!("init failed") });

        assert!(catch_unwind(AssertUnwindSafe(|| *lazy.get())).is_err());
        assert!(!lazy.is_evaluated());

        let err = catch_unwind(AssertUnwindSafe(|| *lazy.get())).unwrap_err();
        let message = err.downcast_ref::<String>().unwrap();
        assert_eq!(message, POISONED);
    }
}

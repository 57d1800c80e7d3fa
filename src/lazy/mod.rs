//! Memoized values computed on first access.
//!
//! Two evaluation strategies share the [`LazyValue`] interface:
//!
//! - [`Lazy`]: no synchronization. It is `!Sync`, so the compiler keeps it on
//!   one thread at a time.
//! - [`SyncLazy`]: safe to share between threads; the computation runs exactly
//!   once even when several threads call [`get`](LazyValue::get) at the same
//!   time.
//!
//! A value that legitimately represents "nothing" (`None`, `()`, an empty
//! collection) is cached like any other. Whether the computation has run is
//! tracked separately from what it returned.

mod sync;
mod unsync;

pub use sync::SyncLazy;
pub use unsync::Lazy;

/// A value computed at most once, on first access.
pub trait LazyValue<T> {
    /// Returns the value, computing it on the first call.
    fn get(&self) -> &T;

    /// True once the computation has produced a value.
    fn is_evaluated(&self) -> bool;
}

const POISONED: &str = "lazy value poisoned: its computation panicked";

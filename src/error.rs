use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error type accepted from fallible task computations.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("thread pool is shut down")]
    ShutDown,

    #[error("deferred task failed")]
    Deferred(#[source] Fault),

    #[error("runtime not initialized")]
    NotInitialized,

    #[error("already initialized")]
    AlreadyInitialized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Returns the fault carried by a [`Error::Deferred`] error.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Error::Deferred(fault) => Some(fault),
            _ => None,
        }
    }

    /// Walks the `source()` chain down to the innermost error.
    ///
    /// For a task that faulted because an upstream task faulted, this is the
    /// error raised by the first computation in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

/// An error captured from a task's computation.
///
/// Cloning is cheap; every reader of a faulted task observes the same
/// underlying error.
#[derive(Clone)]
pub struct Fault {
    cause: Arc<dyn StdError + Send + Sync + 'static>,
}

impl Fault {
    pub fn new<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            cause: Arc::new(cause),
        }
    }

    pub(crate) fn from_boxed(cause: BoxError) -> Self {
        Self {
            cause: Arc::from(cause),
        }
    }

    pub(crate) fn from_panic(message: String) -> Self {
        Self::new(PanicError { message })
    }

    /// The error raised by the computation.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.cause
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.cause.downcast_ref::<E>()
    }

    /// True if the computation panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        self.cause.is::<PanicError>()
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fault").field(&self.cause).finish()
    }
}

// The cause is reported through `source()`, not repeated here.
impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("task computation failed")
    }
}

impl StdError for Fault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.cause)
    }
}

/// A panic caught while running a task computation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task panicked: {message}")]
pub struct PanicError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct DiskOnFire;

    #[test]
    fn test_root_cause_walks_nested_faults() {
        let inner = Error::Deferred(Fault::new(DiskOnFire));
        let outer = Error::Deferred(Fault::new(inner));

        let root = outer.root_cause();
        assert!(root.downcast_ref::<DiskOnFire>().is_some());
        assert_eq!(root.to_string(), "disk on fire");
    }

    #[test]
    fn test_fault_source_is_original_error() {
        let fault = Fault::new(DiskOnFire);
        assert!(fault.source().unwrap().is::<DiskOnFire>());
        assert!(fault.downcast_ref::<DiskOnFire>().is_some());
        assert!(!fault.is_panic());
    }

    #[test]
    fn test_panic_fault() {
        let fault = Fault::from_panic("boom".to_string());
        assert!(fault.is_panic());
        assert_eq!(fault.cause().to_string(), "task panicked: boom");
    }

    #[test]
    fn test_display() {
        let err = Error::Deferred(Fault::new(DiskOnFire));
        assert_eq!(err.to_string(), "deferred task failed");
        assert_eq!(Fault::new(DiskOnFire).to_string(), "task computation failed");
        assert_eq!(Error::ShutDown.to_string(), "thread pool is shut down");
        assert!(Error::ShutDown.fault().is_none());
    }

    #[test]
    fn test_error_chain_names_cause_once() {
        let err = Error::Deferred(Fault::new(DiskOnFire));

        let mut chain = Vec::new();
        let mut current: Option<&(dyn StdError + 'static)> = Some(&err);
        while let Some(e) = current {
            chain.push(e.to_string());
            current = e.source();
        }

        assert_eq!(
            chain,
            vec!["deferred task failed", "task computation failed", "disk on fire"]
        );
    }
}

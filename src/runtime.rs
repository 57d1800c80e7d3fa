//! Optional process-global pool for callers that don't want to pass a
//! [`ThreadPool`] around.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::{TaskHandle, ThreadPool};
use parking_lot::RwLock;
use std::sync::Arc;

static GLOBAL_POOL: RwLock<Option<Arc<ThreadPool>>> = RwLock::new(None);

pub fn init() -> Result<()> {
    init_with_config(Config::default())
}

pub fn init_with_config(config: Config) -> Result<()> {
    let mut global = GLOBAL_POOL.write();

    if global.is_some() {
        return Err(Error::AlreadyInitialized);
    }

    let pool = ThreadPool::with_config(&config)?;
    *global = Some(Arc::new(pool));

    Ok(())
}

/// The global pool, if [`init`] has been called.
pub fn global() -> Result<Arc<ThreadPool>> {
    GLOBAL_POOL.read().clone().ok_or(Error::NotInitialized)
}

/// Submit `f` to the global pool.
pub fn spawn<R, F>(f: F) -> Result<TaskHandle<R>>
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    global()?.submit(f)
}

/// Remove the global pool and shut it down. Does nothing if there is none.
pub fn shutdown() {
    let pool = GLOBAL_POOL.write().take();

    if let Some(pool) = pool {
        pool.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global pool is process-wide, so everything lives in one test.
    #[test]
    fn test_global_lifecycle() {
        shutdown();
        assert!(matches!(spawn(|| 1), Err(Error::NotInitialized)));

        let config = Config::builder().num_threads(2).build().unwrap();
        init_with_config(config).unwrap();
        assert!(matches!(init(), Err(Error::AlreadyInitialized)));
        assert_eq!(global().unwrap().num_threads(), 2);

        let task = spawn(|| 20).unwrap();
        let next = task.continue_with(|x| x + 1).unwrap();
        assert_eq!(next.result().unwrap(), 21);

        let pool = global().unwrap();
        shutdown();
        assert!(pool.is_shutdown());
        assert!(matches!(global(), Err(Error::NotInitialized)));

        // Running shutdown twice is harmless.
        shutdown();
    }
}

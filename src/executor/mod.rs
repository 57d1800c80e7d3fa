//! Task execution infrastructure.
//!
//! This module provides the fixed-size worker pool, the handles returned for
//! submitted work, and the policy applied when task code panics.

pub mod handle;
pub mod panic_handler;
pub mod pool;
pub mod task;
pub mod worker;

pub use handle::TaskHandle;
pub use panic_handler::{PanicHandler, PanicInfo, PanicStrategy};
pub use pool::ThreadPool;
pub use task::TaskId;
pub use worker::WorkerId;

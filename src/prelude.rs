pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Fault, Result};
pub use crate::executor::{PanicStrategy, TaskHandle, ThreadPool};
pub use crate::lazy::{Lazy, LazyValue, SyncLazy};
pub use crate::telemetry::MetricsSnapshot;

pub use crate::{init, init_with_config, shutdown, spawn};

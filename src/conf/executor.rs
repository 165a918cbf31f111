//! Background tasks executor settings.

use std::{borrow::Cow, time::Duration};

use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// Background tasks executor settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, SmartDefault)]
#[serde(default)]
pub struct Executor {
    /// Number of threads polling dispatched tasks.
    /// Defaults to `2`.
    #[default(2)]
    pub worker_threads: usize,

    /// Name of the threads spawned by the executor.
    /// Defaults to `greeter-worker`.
    #[default("greeter-worker")]
    pub thread_name: Cow<'static, str>,

    /// Time an idle blocking thread is kept alive before being stopped.
    /// Defaults to `10s`.
    #[default(Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub thread_keep_alive: Duration,
}

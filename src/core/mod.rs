//! Scheduler core: admission, dispatch and completion.
//!
//! The public entry point is [`Scheduler`] (built directly or through
//! [`SchedulerBuilder`]); the rest are its parts.
//!
//! Internal modules:
//! - [`scheduler`]: run step, failure step, event emission;
//! - [`runner`]: invokes one task and normalizes its outcome;
//! - [`queue`]: ordered pending records;
//! - [`defer`]: deferred-execution host trait and its tokio implementation;
//! - [`config`]: scheduler-wide settings.

mod builder;
mod config;
mod defer;
mod queue;
mod runner;
mod scheduler;

pub use builder::SchedulerBuilder;
pub use config::{DeferredFailure, SchedulerConfig};
pub use defer::{Defer, DeferredJob, TokioDefer};
pub use queue::TaskQueue;
pub use scheduler::Scheduler;

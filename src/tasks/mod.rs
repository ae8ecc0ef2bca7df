//! # Task abstractions and configuration.
//!
//! This module provides the core task-related types:
//! - [`Task`] - trait for callables invoked by the scheduler
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`TaskOptions`] / [`TaskConfig`] - partial input and resolved, validated configuration
//! - [`TaskRecord`] - queued bundle of id, callable and configuration

mod config;
mod record;
mod task;
mod task_fn;

pub use config::{Hooks, TaskConfig, TaskOptions};
pub use record::TaskRecord;
pub use task::{Context, Invocation, Task, TaskOutput, TaskRef, TaskResult};
pub use task_fn::TaskFn;

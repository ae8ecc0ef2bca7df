//! Retry and dispatch policies.
//!
//! This module groups the knobs that control **how** a dequeued task is invoked
//! and **whether** it is put back after a failure.
//!
//! ## Contents
//! - [`Dispatch`] sync call vs deferred callback ([`Deferral`], selected via [`ExecuteIn`])
//! - [`RetryPolicy`] never / on-failure with a remaining budget
//!
//! ## Quick wiring
//! ```text
//! TaskOptions { sync, execute_in, timeout, retry_on_fail, retry_count }
//!      └─► resolve() ─► TaskConfig { dispatch: Dispatch, retry: RetryPolicy }
//!           └─► core::Scheduler uses:
//!                - dispatch to pick the sync or deferred path
//!                - retry.next() to build the replacement record on failure
//! ```
//!
//! ## Defaults
//! - `Dispatch::Sync`
//! - `RetryPolicy::Never`

mod dispatch;
mod retry;

pub use dispatch::{Deferral, Dispatch, ExecuteIn};
pub use retry::RetryPolicy;

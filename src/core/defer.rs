//! # Deferred-execution host.
//!
//! The scheduler never sleeps or spawns by itself. Asynchronous dispatch hands a
//! [`DeferredJob`] to a [`Defer`] implementation together with a [`Deferral`] that
//! says *when* the job should start.
//!
//! ## Contract
//! - `defer` must not run the job inline; the job starts after the current turn
//!   (`Microtask`) or once the delay elapsed (`After`).
//! - A refusal (`Err`) is reported back to the scheduler, which treats it as a
//!   dispatch failure of the task.
//! - The job resolves to `Err` only for failures the scheduler escalates; the host
//!   decides what to do with them ([`TokioDefer`] logs them).
//!
//! ## TokioDefer
//! ```text
//! Deferral::Microtask ──► tokio::spawn(job)
//! Deferral::After(d)  ──► tokio::spawn(sleep(d) → job)
//! ```

use futures::future::BoxFuture;
use tokio::runtime::Handle;

use crate::error::{DeferError, TaskError};
use crate::policies::Deferral;

/// Deferred callback produced by the scheduler.
pub type DeferredJob = BoxFuture<'static, Result<(), TaskError>>;

/// Capability to run a job later.
pub trait Defer: Send + Sync + 'static {
    /// Schedules `job` according to `when`.
    fn defer(&self, when: Deferral, job: DeferredJob) -> Result<(), DeferError>;
}

/// [`Defer`] backed by a tokio runtime.
///
/// Without an explicit handle the runtime of the calling thread is used; calling
/// `defer` outside a runtime fails with [`DeferError::NoRuntime`].
#[derive(Clone, Debug, Default)]
pub struct TokioDefer {
    handle: Option<Handle>,
}

impl TokioDefer {
    /// Uses the runtime current at each `defer` call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always spawns onto `handle`.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn handle(&self) -> Result<Handle, DeferError> {
        match &self.handle {
            Some(h) => Ok(h.clone()),
            None => Handle::try_current().map_err(|_| DeferError::NoRuntime),
        }
    }
}

impl Defer for TokioDefer {
    fn defer(&self, when: Deferral, job: DeferredJob) -> Result<(), DeferError> {
        let handle = self.handle()?;
        handle.spawn(async move {
            if let Deferral::After(delay) = when {
                tokio::time::sleep(delay).await;
            }
            if let Err(e) = job.await {
                tracing::error!(
                    label = e.as_label(),
                    error = %e,
                    "deferred task failed outside the retry path"
                );
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[test]
    fn test_no_runtime_is_refused() {
        let job = async { Ok::<(), TaskError>(()) }.boxed();
        let res = TokioDefer::new().defer(Deferral::Microtask, job);
        assert_eq!(res, Err(DeferError::NoRuntime));
    }

    #[tokio::test(start_paused = true)]
    async fn test_microtask_runs_after_current_turn() {
        let ran = Arc::new(AtomicBool::new(false));
        let r = ran.clone();
        TokioDefer::new()
            .defer(
                Deferral::Microtask,
                async move {
                    r.store(true, Ordering::SeqCst);
                    Ok::<(), TaskError>(())
                }
                .boxed(),
            )
            .unwrap();

        assert!(!ran.load(Ordering::SeqCst));
        tokio::task::yield_now().await;
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_waits_for_delay() {
        let ran = Arc::new(AtomicBool::new(false));
        let r = ran.clone();
        TokioDefer::new()
            .defer(
                Deferral::After(Duration::from_millis(100)),
                async move {
                    r.store(true, Ordering::SeqCst);
                    Err::<(), _>(TaskError::fail("escalated"))
                }
                .boxed(),
            )
            .unwrap();

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(!ran.load(Ordering::SeqCst));
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(ran.load(Ordering::SeqCst));
    }
}

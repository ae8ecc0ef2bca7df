//! # Dispatch modes.
//!
//! [`Dispatch`] says how the scheduler invokes a dequeued task:
//!
//! ```text
//! Dispatch::Sync                         → call now, complete when the call returns
//! Dispatch::Deferred(Deferral::Microtask) → call after the current turn (no delay)
//! Dispatch::Deferred(Deferral::After(d))  → call once the timer `d` fires
//! ```
//!
//! [`ExecuteIn`] is the caller-facing selector used in
//! [`TaskOptions`](crate::TaskOptions); the timeout is supplied separately and
//! validated when the options are resolved.

use std::time::Duration;

/// Deferral mechanism selected by the caller for asynchronous dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecuteIn {
    /// Soonest cooperative turn after the current one.
    MicroTasks,
    /// Delay-based timer; requires a timeout.
    Callback,
}

/// When a deferred callback fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferral {
    /// Run after the current turn, without an explicit delay.
    Microtask,
    /// Run after the given delay.
    After(Duration),
}

impl Deferral {
    /// The caller-facing mode this deferral was built from.
    pub fn execute_in(&self) -> ExecuteIn {
        match self {
            Deferral::Microtask => ExecuteIn::MicroTasks,
            Deferral::After(_) => ExecuteIn::Callback,
        }
    }

    /// Timer delay, only for [`Deferral::After`].
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Deferral::Microtask => None,
            Deferral::After(d) => Some(*d),
        }
    }
}

/// How a task is dispatched once dequeued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dispatch {
    /// Invoke on the calling context; complete as soon as the call returns.
    #[default]
    Sync,
    /// Hand a callback to the deferred-execution host.
    Deferred(Deferral),
}

impl Dispatch {
    /// Returns `true` for [`Dispatch::Sync`].
    pub fn is_sync(&self) -> bool {
        matches!(self, Dispatch::Sync)
    }

    /// Deferral mode, if dispatch is asynchronous.
    pub fn deferral(&self) -> Option<Deferral> {
        match self {
            Dispatch::Sync => None,
            Dispatch::Deferred(d) => Some(*d),
        }
    }
}

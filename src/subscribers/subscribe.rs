//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging observers into the scheduler.
//!
//! ## Rules
//! - `on_event` is called **synchronously**, on the thread that emitted the event,
//!   in subscription order.
//! - No scheduler lock is held during the call; a subscriber may call back into the
//!   scheduler (`add_task`, `run`, `on`, `off`, ...).
//! - Panics are caught and logged; other subscribers still receive the event.
//!
//! ## Example
//! ```rust
//! use queuevisor::{Event, EventKind, Subscribe};
//!
//! struct Failures;
//!
//! impl Subscribe for Failures {
//!     fn on_event(&self, ev: &Event) {
//!         if ev.kind() == EventKind::TaskFailed {
//!             // export a metric, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use crate::events::Event;

/// Event subscriber for scheduler observability.
///
/// ### Implementation requirements
/// - Keep `on_event` short; it runs inline with the scheduler.
/// - Handle errors internally; do not panic.
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed subscriber, see [`Notifier::listen`](crate::events::Notifier::listen).
pub struct FnSubscriber<F> {
    f: F,
}

impl<F> FnSubscriber<F>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Subscribe for FnSubscriber<F>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event) {
        (self.f)(event)
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}

//! # Event subscribers for the queuevisor scheduler.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling events published through the [`Notifier`](crate::events::Notifier).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Scheduler ── emit(Event) ──► Notifier ──► subscribers of that EventKind, in order
//!                                                 │
//!                                            ┌────┴────┬─────────┬───────┐
//!                                            ▼         ▼         ▼       ▼
//!                                         LogWriter  Metrics  Custom    ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use queuevisor::{Subscribe, Event, EventKind};
//!
//! struct MetricsSubscriber;
//!
//! impl Subscribe for MetricsSubscriber {
//!     fn on_event(&self, event: &Event) {
//!         match event.kind() {
//!             EventKind::TaskFailed => {
//!                 // increment failure counter
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::{FnSubscriber, Subscribe};

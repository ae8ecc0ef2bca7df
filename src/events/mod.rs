//! Scheduler events: types and notifier.
//!
//! This module groups the event **data model** and the **notifier** used to
//! publish/subscribe to lifecycle events emitted by the scheduler.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`EventPayload`], [`EventMetadata`] event classification and payloads
//! - [`payload`] one struct per event kind
//! - [`Notifier`] synchronous, ordered fan-out to subscribers
//!
//! ## Quick reference
//! - **Publisher**: `Scheduler` (add, remove, run, completion, failure, retry).
//! - **Consumers**: user subscribers registered with `Scheduler::on` / `subscribe_all`,
//!   the optional `LogWriter`.

mod event;
mod notifier;
pub mod payload;

pub use event::{Event, EventKind, EventMetadata, EventPayload};
pub use notifier::Notifier;

//! # Synchronous event fan-out.
//!
//! [`Notifier`] keeps an ordered list of `(EventKind, subscriber)` pairs and delivers
//! each emitted [`Event`] to the subscribers registered for its kind.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │  (read lock: snapshot matching subscribers, release lock)
//!     ├──► subscriber 1.on_event(&event)
//!     ├──► subscriber 2.on_event(&event)   (subscription order)
//!     └──► subscriber N.on_event(&event)
//!                └─► panic → caught, logged, next subscriber still runs
//! ```
//!
//! ## Rules
//! - **Synchronous**: `emit()` returns after every matching subscriber ran.
//! - **No buffering**: an event with no subscribers is dropped.
//! - **Identity**: `off` removes by `Arc` pointer identity, one registration at a time.
//! - **Re-entrancy**: subscribers may call `on`/`off`/`emit`; changes apply to the next emit.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::{Arc, PoisonError, RwLock};

use super::event::{Event, EventKind};
use crate::subscribers::{FnSubscriber, Subscribe};

/// Subscription entry.
struct Registration {
    kind: EventKind,
    subscriber: Arc<dyn Subscribe>,
}

/// Typed publish/subscribe mediator for scheduler events.
#[derive(Default)]
pub struct Notifier {
    registrations: RwLock<Vec<Registration>>,
}

impl Notifier {
    /// Creates a notifier without subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `subscriber` for `kind`. The same subscriber may be registered more than once.
    pub fn on(&self, kind: EventKind, subscriber: Arc<dyn Subscribe>) {
        self.write().push(Registration { kind, subscriber });
    }

    /// Removes the earliest registration of `subscriber` for `kind`.
    ///
    /// Returns `false` when no such registration exists.
    pub fn off(&self, kind: EventKind, subscriber: &Arc<dyn Subscribe>) -> bool {
        let mut regs = self.write();
        let pos = regs
            .iter()
            .position(|r| r.kind == kind && same_subscriber(&r.subscriber, subscriber));
        match pos {
            Some(i) => {
                regs.remove(i);
                true
            }
            None => false,
        }
    }

    /// Registers a closure for `kind` and returns its handle (for [`off`](Self::off)).
    pub fn listen<F>(&self, kind: EventKind, f: F) -> Arc<dyn Subscribe>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let sub: Arc<dyn Subscribe> = Arc::new(FnSubscriber::new(f));
        self.on(kind, Arc::clone(&sub));
        sub
    }

    /// Registers `subscriber` for every [`EventKind`].
    pub fn subscribe_all(&self, subscriber: Arc<dyn Subscribe>) {
        let mut regs = self.write();
        for kind in EventKind::ALL {
            regs.push(Registration {
                kind,
                subscriber: Arc::clone(&subscriber),
            });
        }
    }

    /// Removes every registration of `subscriber`, whatever the kind.
    pub fn unsubscribe_all(&self, subscriber: &Arc<dyn Subscribe>) {
        self.write()
            .retain(|r| !same_subscriber(&r.subscriber, subscriber));
    }

    /// Number of registrations for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.read().iter().filter(|r| r.kind == kind).count()
    }

    /// Delivers `event` to the subscribers of its kind, in subscription order.
    pub fn emit(&self, event: Event) {
        let kind = event.kind();
        let targets: Vec<Arc<dyn Subscribe>> = self
            .read()
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| Arc::clone(&r.subscriber))
            .collect();

        for sub in targets {
            let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                sub.on_event(&event)
            }));
            if let Err(payload) = res {
                tracing::warn!(
                    subscriber = sub.name(),
                    event = %kind,
                    panic = %crate::error::panic_message(payload.as_ref()),
                    "subscriber panicked"
                );
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Registration>> {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Registration>> {
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pointer identity, ignoring vtable metadata.
fn same_subscriber(a: &Arc<dyn Subscribe>, b: &Arc<dyn Subscribe>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(
        kind: EventKind,
        n: &Notifier,
        log: &Arc<Mutex<Vec<&'static str>>>,
        tag: &'static str,
    ) -> Arc<dyn Subscribe> {
        let log = Arc::clone(log);
        n.listen(kind, move |_ev| log.lock().unwrap().push(tag))
    }

    #[test]
    fn test_delivers_in_subscription_order() {
        let n = Notifier::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(EventKind::QueueEmpty, &n, &log, "a");
        recorder(EventKind::QueueEmpty, &n, &log, "b");
        recorder(EventKind::QueueFull, &n, &log, "other");

        n.emit(Event::queue_empty());
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_off_by_identity() {
        let n = Notifier::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recorder(EventKind::QueueFull, &n, &log, "a");
        recorder(EventKind::QueueFull, &n, &log, "b");

        assert!(!n.off(EventKind::QueueEmpty, &a));
        assert!(n.off(EventKind::QueueFull, &a));
        assert!(!n.off(EventKind::QueueFull, &a));
        assert_eq!(n.listener_count(EventKind::QueueFull), 1);

        n.emit(Event::queue_full());
        assert_eq!(*log.lock().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_event_without_subscribers_is_dropped() {
        let n = Notifier::new();
        n.emit(Event::queue_empty());
        assert_eq!(n.listener_count(EventKind::QueueEmpty), 0);
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let n = Notifier::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        n.listen(EventKind::QueueEmpty, |_ev| panic!("boom"));
        recorder(EventKind::QueueEmpty, &n, &log, "after");

        n.emit(Event::queue_empty());
        assert_eq!(*log.lock().unwrap(), vec!["after"]);
    }

    #[test]
    fn test_subscribe_all_and_unsubscribe_all() {
        let n = Notifier::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let sub: Arc<dyn Subscribe> = Arc::new(FnSubscriber::new(move |ev: &Event| {
            l.lock().unwrap().push(ev.kind().as_str())
        }));
        n.subscribe_all(Arc::clone(&sub));
        for kind in EventKind::ALL {
            assert_eq!(n.listener_count(kind), 1);
        }

        n.emit(Event::queue_empty());
        n.emit(Event::queue_full());
        n.unsubscribe_all(&sub);
        n.emit(Event::queue_empty());
        assert_eq!(*log.lock().unwrap(), vec!["queueEmpty", "queueFull"]);
    }

    #[test]
    fn test_subscriber_may_unsubscribe_itself() {
        let n = Arc::new(Notifier::new());
        let hits = Arc::new(Mutex::new(0));
        let slot: Arc<Mutex<Option<Arc<dyn Subscribe>>>> = Arc::new(Mutex::new(None));

        let (n2, h2, s2) = (Arc::clone(&n), Arc::clone(&hits), Arc::clone(&slot));
        let me = n.listen(EventKind::QueueEmpty, move |_ev| {
            *h2.lock().unwrap() += 1;
            if let Some(me) = s2.lock().unwrap().take() {
                n2.off(EventKind::QueueEmpty, &me);
            }
        });
        *slot.lock().unwrap() = Some(me);

        n.emit(Event::queue_empty());
        n.emit(Event::queue_empty());
        assert_eq!(*hits.lock().unwrap(), 1);
    }
}

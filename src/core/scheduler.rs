//! # Scheduler: bounded-concurrency task queue with lifecycle events.
//!
//! The [`Scheduler`] owns the [`TaskQueue`], the in-flight counter and the
//! [`Notifier`]. Callers enqueue with [`Scheduler::add_task`] and drive admission
//! with [`Scheduler::run`]; completions chain further run attempts automatically.
//!
//! ## Run step
//! ```text
//! run() ── loop ──► run_once()
//!                     ├─ queue empty           → QueueEmpty                     → stop
//!                     ├─ active ≥ limit        → QueueFull                      → stop
//!                     └─ active += 1, pop head → TaskStarted
//!                           │
//!                           ├─ Sync:     call ─┬─ Ok  → TaskCompleted, release   → chain
//!                           │                  └─ Err → failure step, release    → chain
//!                           │            on_finally
//!                           │
//!                           └─ Deferred: Defer::defer(job) ─┬─ Ok  → on_finally  → stop
//!                                                           └─ Err → failure step, release,
//!                                                                    on_finally  → chain
//!
//! job (later): call/await ─┬─ Ok  → on_success, TaskCompleted, release, run()
//!                          └─ Err → Escalate: release, run(), Err to the Defer host
//!                                   Retry:    failure step, release, run()
//!
//! failure step: TaskFailed → on_error → [budget left] on_retry → TaskRetrying
//!               → re-add at the front with budget - 1 (TaskAdded, priority)
//! ```
//!
//! ## Rules
//! - Queue and counter are mutated under one lock. The event for a mutation is
//!   built (sequence number and metadata) and staged in an outbox under the same
//!   lock, so the outbox order is the mutation order.
//! - The outbox is delivered by one thread at a time: the caller that staged into
//!   an idle outbox drains it after releasing the lock. Events staged meanwhile by
//!   other threads, or by listeners re-entering the scheduler, are delivered by that
//!   drainer once the current listener returns.
//! - Listeners and hooks never run while the lock is held, so they may call back
//!   into the scheduler.
//! - A slot is held from dequeue until completion or failure, including the time a
//!   deferred job waits for its timer.
//! - Each completion or failure is followed by exactly one run attempt.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;

use super::builder::SchedulerBuilder;
use super::config::{DeferredFailure, SchedulerConfig};
use super::defer::Defer;
use super::queue::TaskQueue;
use super::runner;
use crate::error::{ConfigError, TaskError};
use crate::events::payload::{
    TaskAdded, TaskCompleted, TaskFailed, TaskRemoved, TaskRetrying, TaskStarted,
};
use crate::events::{Event, EventKind, EventMetadata, EventPayload, Notifier};
use crate::policies::{Deferral, Dispatch};
use crate::subscribers::Subscribe;
use crate::tasks::{TaskOptions, TaskRecord, TaskRef};

/// Queue, in-flight counter and pending events, guarded together.
#[derive(Default)]
struct State {
    queue: TaskQueue,
    active: usize,
    /// Events in mutation order, not yet delivered.
    outbox: VecDeque<Event>,
    /// Some caller is delivering the outbox.
    draining: bool,
}

impl State {
    fn snapshot(&self) -> EventMetadata {
        EventMetadata {
            queue_length: self.queue.len(),
            active_tasks: self.active,
        }
    }

    /// Stages a task event carrying the current snapshot.
    ///
    /// Returns `true` when the caller became the drainer and must call `flush`.
    fn stage(&mut self, payload: EventPayload) -> bool {
        let event = Event::new(payload).with_metadata(self.snapshot());
        self.push(event)
    }

    fn push(&mut self, event: Event) -> bool {
        self.outbox.push_back(event);
        !std::mem::replace(&mut self.draining, true)
    }

    fn insert(&mut self, record: TaskRecord, priority: bool) -> bool {
        let added = TaskAdded {
            id: record.shared_id(),
            config: record.config().clone(),
            priority,
        };
        if priority {
            self.queue.push_front(record);
        } else {
            self.queue.push_back(record);
        }
        self.stage(EventPayload::TaskAdded(added))
    }

    fn release(&mut self) {
        self.active = self.active.saturating_sub(1);
    }
}

struct Inner {
    cfg: SchedulerConfig,
    limit: usize,
    state: Mutex<State>,
    notifier: Notifier,
    defer: Arc<dyn Defer>,
}

/// Whether the drain loop should attempt another admission.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Idle,
    Chain,
}

/// Handle to a task scheduler.
///
/// Cloning is cheap; every clone drives the same queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Scheduler with the given concurrency ceiling (0 is treated as 1) and the
    /// tokio-backed deferred-execution host.
    pub fn new(concurrency_limit: usize) -> Self {
        Self::builder(SchedulerConfig::with_limit(concurrency_limit)).build()
    }

    /// Starts a [`SchedulerBuilder`] for custom subscribers or a custom [`Defer`].
    pub fn builder(cfg: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: SchedulerConfig,
        notifier: Notifier,
        defer: Arc<dyn Defer>,
    ) -> Self {
        let limit = cfg.concurrency_limit_clamped();
        Self {
            inner: Arc::new(Inner {
                cfg,
                limit,
                state: Mutex::new(State::default()),
                notifier,
                defer,
            }),
        }
    }

    // ---- subscription ----

    /// Registers `subscriber` on one channel.
    pub fn on(&self, kind: EventKind, subscriber: Arc<dyn Subscribe>) {
        self.inner.notifier.on(kind, subscriber);
    }

    /// Removes `subscriber` (matched by identity) from one channel.
    pub fn off(&self, kind: EventKind, subscriber: &Arc<dyn Subscribe>) -> bool {
        self.inner.notifier.off(kind, subscriber)
    }

    /// Registers a closure on one channel; keep the returned handle to call [`off`](Self::off).
    pub fn listen<F>(&self, kind: EventKind, f: F) -> Arc<dyn Subscribe>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.inner.notifier.listen(kind, f)
    }

    /// Registers `subscriber` on every channel.
    pub fn subscribe_all(&self, subscriber: Arc<dyn Subscribe>) {
        self.inner.notifier.subscribe_all(subscriber);
    }

    /// Removes `subscriber` from every channel.
    pub fn unsubscribe_all(&self, subscriber: &Arc<dyn Subscribe>) {
        self.inner.notifier.unsubscribe_all(subscriber);
    }

    // ---- queue operations ----

    /// Validates `options`, enqueues the task and emits `TaskAdded`.
    ///
    /// With `priority` the record goes to the front of the queue. Nothing is
    /// dispatched; call [`run`](Self::run) for that. On a configuration error the
    /// queue is left untouched and no event is emitted.
    pub fn add_task(
        &self,
        task: TaskRef,
        id: impl Into<Arc<str>>,
        options: TaskOptions,
        priority: bool,
    ) -> Result<(), ConfigError> {
        let id = id.into();
        let config = options.resolve().inspect_err(|e| {
            tracing::debug!(task = %id, label = e.as_label(), "task rejected: {e}");
        })?;
        self.enqueue(TaskRecord::new(id, task, config), priority);
        Ok(())
    }

    /// Drops the head of the queue without running it and emits `TaskRemoved`.
    ///
    /// The event is emitted on an empty queue too, with `id = None`.
    pub fn remove_task(&self) -> Option<TaskRecord> {
        let (removed, drain) = {
            let mut st = self.state();
            let removed = st.queue.pop_front();
            let id = removed.as_ref().map(TaskRecord::shared_id);
            let drain = st.stage(EventPayload::TaskRemoved(TaskRemoved { id }));
            (removed, drain)
        };
        self.flush(drain);
        removed
    }

    /// Admits queued tasks until the queue is empty, the ceiling is reached or a
    /// task was handed to the deferred-execution host.
    ///
    /// Never fails: empty and full queues are reported as `QueueEmpty` and `QueueFull`.
    pub fn run(&self) {
        while self.run_once() == Step::Chain {}
    }

    // ---- accessors ----

    /// Number of queued (not yet dispatched) tasks.
    pub fn len(&self) -> usize {
        self.state().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().queue.is_empty()
    }

    /// Number of tasks holding a slot.
    pub fn active_tasks(&self) -> usize {
        self.state().active
    }

    /// Effective concurrency ceiling (at least 1).
    pub fn concurrency_limit(&self) -> usize {
        self.inner.limit
    }

    /// Current queue length and in-flight count.
    pub fn metadata(&self) -> EventMetadata {
        self.state().snapshot()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.cfg
    }

    /// Ids of queued tasks in dequeue order.
    pub fn queued_ids(&self) -> Vec<String> {
        self.state().queue.ids().map(str::to_owned).collect()
    }

    // ---- internals ----

    fn run_once(&self) -> Step {
        let (admitted, drain) = {
            let mut st = self.state();
            if st.active >= self.inner.limit && !st.queue.is_empty() {
                tracing::debug!(limit = self.inner.limit, "all slots occupied");
                (None, st.push(Event::queue_full()))
            } else {
                match st.queue.pop_front() {
                    Some(record) => {
                        st.active += 1;
                        let drain = st.stage(EventPayload::TaskStarted(TaskStarted {
                            id: record.shared_id(),
                            config: record.config().clone(),
                        }));
                        (Some(record), drain)
                    }
                    None => (None, st.push(Event::queue_empty())),
                }
            }
        };
        self.flush(drain);

        let Some(record) = admitted else {
            return Step::Idle;
        };

        let step = match record.config().dispatch() {
            Dispatch::Sync => self.dispatch_sync(&record),
            Dispatch::Deferred(when) => self.dispatch_deferred(&record, when),
        };
        record.config().hooks().finally();
        step
    }

    fn dispatch_sync(&self, record: &TaskRecord) -> Step {
        tracing::debug!(task = record.id(), "dispatching inline");
        match runner::call_sync(record) {
            Ok(pending) => {
                if let Some(fut) = pending {
                    self.detach(record, fut);
                }
                self.complete(record);
            }
            Err(e) => self.fail(record, e),
        }
        Step::Chain
    }

    fn dispatch_deferred(&self, record: &TaskRecord, when: Deferral) -> Step {
        tracing::debug!(task = record.id(), deferral = ?when, "dispatching deferred");
        let job = self.clone().finish_deferred(record.clone()).boxed();
        match self.inner.defer.defer(when, job) {
            Ok(()) => Step::Idle,
            Err(e) => {
                tracing::debug!(task = record.id(), label = e.as_label(), "deferral refused");
                self.fail(record, TaskError::Dispatch(e));
                Step::Chain
            }
        }
    }

    /// Body of a deferred job.
    async fn finish_deferred(self, record: TaskRecord) -> Result<(), TaskError> {
        match runner::call_deferred(&record).await {
            Ok(value) => {
                record.config().hooks().success(&value);
                self.complete(&record);
                self.run();
                Ok(())
            }
            Err(e) => match self.inner.cfg.deferred_failures {
                DeferredFailure::Retry => {
                    self.fail(&record, e);
                    self.run();
                    Ok(())
                }
                DeferredFailure::Escalate => {
                    self.release();
                    self.run();
                    Err(e)
                }
            },
        }
    }

    /// Runs the pending output of a sync task after the current turn.
    fn detach(&self, record: &TaskRecord, fut: runner::Detached) {
        let job = async move { runner::settle(fut).await.map(|_| ()) }.boxed();
        if let Err(e) = self.inner.defer.defer(Deferral::Microtask, job) {
            tracing::warn!(
                task = record.id(),
                label = e.as_label(),
                "pending output of an inline task dropped"
            );
        }
    }

    fn complete(&self, record: &TaskRecord) {
        let drain = {
            let mut st = self.state();
            let drain = st.stage(EventPayload::TaskCompleted(TaskCompleted {
                id: record.shared_id(),
                config: record.config().clone(),
            }));
            st.release();
            drain
        };
        self.flush(drain);
    }

    /// Failure step: report, retry if budget is left, release the slot.
    fn fail(&self, record: &TaskRecord, error: TaskError) {
        let hooks = record.config().hooks();
        let drain = self.state().stage(EventPayload::TaskFailed(TaskFailed {
            id: record.shared_id(),
            config: record.config().clone(),
            error: error.clone(),
        }));
        self.flush(drain);
        hooks.error(&error);

        match (record.config().retry_count(), record.retried()) {
            (Some(count), Some(next)) => {
                hooks.retry(&error, count);
                let drain = {
                    let mut st = self.state();
                    let retrying = st.stage(EventPayload::TaskRetrying(TaskRetrying {
                        id: record.shared_id(),
                        config: record.config().clone(),
                        count,
                        error,
                    }));
                    let added = st.insert(next, true);
                    retrying || added
                };
                self.flush(drain);
            }
            _ => {
                tracing::debug!(task = record.id(), label = error.as_label(), "task dropped");
            }
        }
        self.release();
    }

    fn enqueue(&self, record: TaskRecord, priority: bool) {
        tracing::debug!(task = record.id(), priority, "task added");
        let drain = self.state().insert(record, priority);
        self.flush(drain);
    }

    fn release(&self) {
        self.state().release();
    }

    /// Delivers staged events in order until the outbox is empty.
    ///
    /// No-op unless `drain` says the caller is the drainer.
    fn flush(&self, drain: bool) {
        if !drain {
            return;
        }
        loop {
            let next = {
                let mut st = self.state();
                match st.outbox.pop_front() {
                    Some(event) => event,
                    None => {
                        st.draining = false;
                        return;
                    }
                }
            };
            self.inner.notifier.emit(next);
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let meta = self.metadata();
        f.debug_struct("Scheduler")
            .field("concurrency_limit", &self.inner.limit)
            .field("queue_length", &meta.queue_length)
            .field("active_tasks", &meta.active_tasks)
            .field("deferred_failures", &self.inner.cfg.deferred_failures)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Log = Arc<Mutex<Vec<(EventKind, Option<String>, Option<EventMetadata>)>>>;

    fn record_all(s: &Scheduler) -> Log {
        let log: Log = Arc::default();
        let l = log.clone();
        s.subscribe_all(Arc::new(crate::subscribers::FnSubscriber::new(
            move |e: &Event| {
                l.lock()
                    .unwrap()
                    .push((e.kind(), e.task_id().map(str::to_owned), e.metadata));
            },
        )));
        log
    }

    fn kinds(log: &Log) -> Vec<EventKind> {
        log.lock().unwrap().iter().map(|(k, _, _)| *k).collect()
    }

    fn ok_task() -> TaskRef {
        TaskFn::blocking(|_| Ok(Value::Null))
    }

    #[test]
    fn test_add_does_not_dispatch() {
        let s = Scheduler::new(1);
        let log = record_all(&s);
        s.add_task(ok_task(), "a", TaskOptions::new(), false).unwrap();

        assert_eq!(s.len(), 1);
        assert_eq!(s.active_tasks(), 0);
        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![(
                EventKind::TaskAdded,
                Some("a".to_string()),
                Some(EventMetadata {
                    queue_length: 1,
                    active_tasks: 0
                })
            )]
        );
    }

    #[test]
    fn test_sync_success_chains_until_empty() {
        let s = Scheduler::new(1);
        s.add_task(ok_task(), "a", TaskOptions::new(), false).unwrap();
        let log = record_all(&s);

        s.run();

        assert_eq!(
            kinds(&log),
            [
                EventKind::TaskStarted,
                EventKind::TaskCompleted,
                EventKind::QueueEmpty
            ]
        );
        let events = log.lock().unwrap().clone();
        let started = EventMetadata {
            queue_length: 0,
            active_tasks: 1,
        };
        assert_eq!(events[0].2, Some(started));
        assert_eq!(events[1].2, Some(started));
        assert_eq!(events[2].2, None);
        assert_eq!(s.active_tasks(), 0);
    }

    #[test]
    fn test_empty_run_emits_only_queue_empty() {
        let s = Scheduler::new(3);
        let log = record_all(&s);
        s.run();
        assert_eq!(kinds(&log), [EventKind::QueueEmpty]);
        assert_eq!(s.active_tasks(), 0);
    }

    #[test]
    fn test_config_error_leaves_queue_untouched() {
        let s = Scheduler::new(1);
        let log = record_all(&s);
        let err = s
            .add_task(ok_task(), "bad", TaskOptions::new().retry_on_fail(true), false)
            .unwrap_err();
        assert_eq!(err, ConfigError::RetryCountRequired);
        assert!(s.is_empty());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_remove_task_reports_head_or_none() {
        let s = Scheduler::new(1);
        s.add_task(ok_task(), "a", TaskOptions::new(), false).unwrap();
        s.add_task(ok_task(), "b", TaskOptions::new(), false).unwrap();
        let log = record_all(&s);

        assert_eq!(s.remove_task().map(|r| r.id().to_string()), Some("a".into()));
        assert_eq!(s.queued_ids(), ["b"]);
        s.remove_task();
        assert!(s.remove_task().is_none());

        let events = log.lock().unwrap().clone();
        let ids: Vec<_> = events.iter().map(|(_, id, _)| id.clone()).collect();
        assert_eq!(ids, [Some("a".into()), Some("b".into()), None]);
        assert!(
            events
                .iter()
                .all(|(k, _, m)| *k == EventKind::TaskRemoved && m.is_some())
        );
        assert_eq!(events[0].2.map(|m| m.queue_length), Some(1));
    }

    #[test]
    fn test_sync_failure_retries_exactly_budget_times() {
        let calls = Arc::new(AtomicUsize::new(0));
        let retries = Arc::new(Mutex::new(Vec::new()));
        let finals = Arc::new(AtomicUsize::new(0));

        let c = calls.clone();
        let task = TaskFn::blocking(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Err(TaskError::fail("always"))
        });
        let r = retries.clone();
        let f = finals.clone();
        let opts = TaskOptions::new()
            .retry(3)
            .on_retry(move |_, n| r.lock().unwrap().push(n))
            .on_finally(move || {
                f.fetch_add(1, Ordering::SeqCst);
            });

        let s = Scheduler::new(1);
        s.add_task(task, "flaky", opts, false).unwrap();
        let log = record_all(&s);
        s.run();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(*retries.lock().unwrap(), [3, 2, 1]);
        assert_eq!(finals.load(Ordering::SeqCst), 4);

        let k = kinds(&log);
        assert_eq!(k.iter().filter(|k| **k == EventKind::TaskFailed).count(), 4);
        assert_eq!(k.iter().filter(|k| **k == EventKind::TaskRetrying).count(), 3);
        assert_eq!(k.iter().filter(|k| **k == EventKind::TaskAdded).count(), 3);
        assert_eq!(k.last(), Some(&EventKind::QueueEmpty));
        assert_eq!(s.active_tasks(), 0);
        assert!(s.is_empty());
    }

    #[test]
    fn test_priority_goes_first() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let s = Scheduler::new(1);
        for (id, prio) in [("a", false), ("b", false), ("p", true)] {
            let o = order.clone();
            let task = TaskFn::blocking(move |_| {
                o.lock().unwrap().push(id);
                Ok(Value::Null)
            });
            s.add_task(task, id, TaskOptions::new(), prio).unwrap();
        }
        s.run();
        assert_eq!(*order.lock().unwrap(), ["p", "a", "b"]);
    }

    #[test]
    fn test_deferred_without_runtime_fails_through_retry_path() {
        let s = Scheduler::new(1);
        let opts = TaskOptions::new()
            .sync(false)
            .execute_in(crate::policies::ExecuteIn::MicroTasks);
        s.add_task(ok_task(), "d", opts, false).unwrap();
        let log = record_all(&s);
        s.run();

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events.iter().map(|(k, _, _)| *k).collect::<Vec<_>>(),
            [
                EventKind::TaskStarted,
                EventKind::TaskFailed,
                EventKind::QueueEmpty
            ]
        );
        assert_eq!(s.active_tasks(), 0);
    }
}

//! # Headless dispatcher: the arbiter of "can we deliver this right now".
//!
//! [`HeadlessDispatcher`] owns the readiness state machine, starts the
//! background context exactly once, queues requests that arrive before the
//! context signals readiness, and replays them in submission order once it
//! does.
//!
//! ## State machine (per process lifetime)
//! ```text
//!              submit(req)                    Initialized signal
//!   ┌──────┐  enqueue + launch   ┌───────────┐  drain queue (FIFO)  ┌───────┐
//!   │ Cold │ ──────────────────► │ Launching │ ───────────────────► │ Ready │
//!   └──────┘                     └───────────┘  fire ready-listeners└───────┘
//!      ▲                            │    │                             │
//!      │   launch failed:           │    │ submit(req):                │ submit(req):
//!      └── finish(task), reset ◄────┘    └ enqueue (idempotent launch) └ deliver now
//! ```
//!
//! ## Rules
//! - **Single critical section**: phase, pending queue, context handle and
//!   the loaded registration all live behind one lock; `acknowledge` drains
//!   while holding it, so no request is delivered twice or stranded.
//! - **Non-blocking submit**: delivery is an unbounded channel send; the
//!   worker that fired the task is never parked on the context.
//! - **FIFO, duplicates preserved**: each firing is a distinct delivery.
//! - **Every discard finishes the task**: a request dropped for any reason
//!   is paired with exactly one `finish(task_id)` toward the scheduler, so
//!   no wake resource leaks on the platform side.
//! - **Failed launch is retryable**: resolution failure resets to `Cold`;
//!   the next submit may try again.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::context::{
    CallbackResolver, ContextSignal, DispatchMessage, ExecutionContext, Launcher, SignalReceiver,
};
use crate::dispatch::ready::ReadyListeners;
use crate::dispatch::request::DispatchRequest;
use crate::error::DispatchError;
use crate::events::{Bus, Event, EventKind};
use crate::scheduler::SchedulerHooks;
use crate::store::{Registrar, RegistrationPolicy, RegistrationRecord, RegistrationStore};

/// Readiness of the background context, per process lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No context exists.
    Cold,
    /// Context creation in progress; requests are being queued.
    Launching,
    /// The context acknowledged initialization; delivery is immediate.
    Ready,
}

/// State guarded by the dispatcher's single lock.
struct Inner {
    phase: Phase,
    pending: VecDeque<DispatchRequest>,
    context: Option<ExecutionContext>,
    /// Read at most once per cold start, immutable afterwards.
    registration: Option<RegistrationRecord>,
}

/// Owns the headless delivery pipeline end to end.
///
/// Explicitly constructed and passed by `Arc` - no process-wide statics.
/// The scheduler collaborator routes its fetch/timeout signals into
/// [`on_fire`](Self::on_fire) / [`on_deadline`](Self::on_deadline); the
/// registered client callback observes each of them inside the background
/// context.
pub struct HeadlessDispatcher {
    inner: Mutex<Inner>,
    listeners: ReadyListeners,
    launcher: Launcher,
    store: Arc<dyn RegistrationStore>,
    scheduler: Arc<dyn SchedulerHooks>,
    policy: RegistrationPolicy,
    bus: Bus,
    /// Self-handle for tasks spawned by the dispatcher (signal listener).
    me: Weak<HeadlessDispatcher>,
}

impl HeadlessDispatcher {
    /// Creates a dispatcher with its collaborators injected.
    pub fn new(
        cfg: Config,
        store: Arc<dyn RegistrationStore>,
        resolver: Arc<dyn CallbackResolver>,
        scheduler: Arc<dyn SchedulerHooks>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            inner: Mutex::new(Inner {
                phase: Phase::Cold,
                pending: VecDeque::new(),
                context: None,
                registration: None,
            }),
            listeners: ReadyListeners::new(),
            launcher: Launcher::new(resolver, Arc::clone(&scheduler)),
            store,
            scheduler,
            policy: cfg.policy,
            bus: Bus::new(cfg.bus_capacity),
            me: me.clone(),
        })
    }

    /// The event bus this dispatcher publishes on.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// A registration front sharing this dispatcher's store, policy and bus.
    pub fn registrar(&self) -> Registrar {
        Registrar::new(Arc::clone(&self.store), self.policy, self.bus.clone())
    }

    /// Current phase of the state machine.
    pub async fn phase(&self) -> Phase {
        self.inner.lock().await.phase
    }

    /// Whether the context has already acknowledged initialization.
    ///
    /// Listeners registered via [`on_context_ready`](Self::on_context_ready)
    /// after this returns `true` will never fire; such callers must handle
    /// the already-ready case themselves.
    pub async fn is_ready(&self) -> bool {
        self.inner.lock().await.phase == Phase::Ready
    }

    /// Normal fetch signal from the scheduler collaborator.
    pub async fn on_fire(&self, task_id: &str) {
        self.submit(DispatchRequest::fetch(task_id)).await;
    }

    /// Deadline/timeout signal from the scheduler collaborator.
    pub async fn on_deadline(&self, task_id: &str) {
        self.submit(DispatchRequest::deadline(task_id)).await;
    }

    /// Registers a one-shot listener fired when the context becomes ready.
    ///
    /// Listeners fire exactly once, in insertion order, with the freshly
    /// created [`ExecutionContext`]. Registering after the ready transition
    /// is a no-op for this mechanism.
    pub fn on_context_ready(&self, f: impl FnOnce(&ExecutionContext) + Send + 'static) {
        self.listeners.push(Box::new(f));
    }

    /// Submits one dispatch request.
    ///
    /// May be called concurrently from any number of workers. Never blocks
    /// beyond the dispatcher's short critical section.
    pub async fn submit(&self, req: DispatchRequest) {
        let mut inner = self.inner.lock().await;
        match inner.phase {
            Phase::Ready => {
                self.deliver_locked(&mut inner, req).await;
            }
            Phase::Launching => {
                debug!(task = %req.task_id, "waiting for client to initialize");
                self.bus.publish(
                    Event::new(EventKind::DispatchQueued)
                        .with_task(req.task_id.clone())
                        .with_timeout(req.timed_out),
                );
                inner.pending.push_back(req);
            }
            Phase::Cold => {
                inner.phase = Phase::Launching;
                self.bus
                    .publish(Event::new(EventKind::ContextLaunching).with_task(req.task_id.clone()));
                inner.pending.push_back(req.clone());

                if let Err(err) = self.cold_start(&mut inner).await {
                    // Only the triggering request can be queued at this
                    // point: Cold implies an empty queue.
                    inner.phase = Phase::Cold;
                    inner.pending.pop_back();
                    error!(task = %req.task_id, error = %err, "headless launch failed");
                    self.scheduler.finish(&req.task_id).await;

                    let mut ev = Event::new(EventKind::LaunchFailed)
                        .with_task(req.task_id.clone())
                        .with_reason(err.as_message());
                    if let DispatchError::CallbackResolution { callback_id } = err {
                        ev = ev.with_callback_id(callback_id);
                    }
                    self.bus.publish(ev);
                    self.bus.publish(
                        Event::new(EventKind::DispatchDropped)
                            .with_task(req.task_id)
                            .with_reason(err.as_label()),
                    );
                }
            }
        }
    }

    /// Marks the context ready and drains the pending queue.
    ///
    /// Normally driven by the context's `Initialized` signal; safe to call
    /// directly and idempotent - only the first call performs the
    /// transition.
    pub async fn acknowledge(&self) {
        let mut inner = self.inner.lock().await;
        if inner.phase == Phase::Ready {
            return;
        }
        let Some(ctx) = inner.context.clone() else {
            warn!("initialization acknowledged without a running context");
            return;
        };
        inner.phase = Phase::Ready;
        while let Some(req) = inner.pending.pop_front() {
            self.deliver_locked(&mut inner, req).await;
        }
        self.listeners.drain(&ctx);
        self.bus.publish(Event::new(EventKind::ContextReady));
    }

    /// Loads the registration (once) and launches the context.
    async fn cold_start(&self, inner: &mut Inner) -> Result<(), DispatchError> {
        let rec = match inner.registration {
            Some(rec) => rec,
            None => {
                // Absent registration behaves like a failed lookup of the
                // sentinel identifier, so the triggering task gets finished
                // and a later registration can still succeed.
                let rec = self
                    .store
                    .load()
                    .await?
                    .ok_or(DispatchError::CallbackResolution { callback_id: -1 })?;
                inner.registration = Some(rec);
                rec
            }
        };

        let outcome = self.launcher.launch(rec.bootstrap_id).await?;
        inner.context = Some(outcome.context);
        if let Some(signals) = outcome.signals {
            self.spawn_signal_listener(signals);
        }
        Ok(())
    }

    /// Forwards the context's signals into the state machine.
    fn spawn_signal_listener(&self, mut signals: SignalReceiver) {
        let Some(me) = self.me.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            while let Some(sig) = signals.recv().await {
                match sig {
                    ContextSignal::Initialized => me.acknowledge().await,
                }
            }
        });
    }

    /// Builds and sends one dispatch message; on any failure finishes the
    /// owning task so the scheduler slot is released.
    async fn deliver_locked(&self, inner: &mut Inner, req: DispatchRequest) {
        let result = match (inner.registration, inner.context.as_ref()) {
            (Some(rec), Some(ctx)) => ctx
                .deliver(DispatchMessage {
                    client_id: rec.client_id,
                    task_id: req.task_id.clone(),
                    timed_out: req.timed_out,
                })
                .map(|()| rec.client_id),
            (None, _) => Err(DispatchError::MalformedPayload {
                detail: "no registration record loaded".to_string(),
            }),
            (_, None) => Err(DispatchError::ChannelUnavailable),
        };

        match result {
            Ok(client_id) => {
                self.bus.publish(
                    Event::new(EventKind::DispatchDelivered)
                        .with_task(req.task_id)
                        .with_timeout(req.timed_out)
                        .with_callback_id(client_id),
                );
            }
            Err(err) => {
                error!(task = %req.task_id, error = %err, "dispatch failed; finishing task");
                self.scheduler.finish(&req.task_id).await;
                self.bus.publish(
                    Event::new(EventKind::DispatchDropped)
                        .with_task(req.task_id)
                        .with_reason(err.as_label()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BootstrapCallback, ClientCallback, ContextHandle, TaskEvent};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    const BOOTSTRAP_ID: i64 = 100;
    const CLIENT_ID: i64 = 200;

    /// Bootstrap that returns without signaling; tests acknowledge manually.
    struct SilentBootstrap;

    #[async_trait]
    impl BootstrapCallback for SilentBootstrap {
        async fn run(&self, _handle: ContextHandle) {}
    }

    /// Bootstrap that signals readiness immediately.
    struct SignalingBootstrap;

    #[async_trait]
    impl BootstrapCallback for SignalingBootstrap {
        async fn run(&self, handle: ContextHandle) {
            handle.notify_initialized();
        }
    }

    struct RecordingClient {
        events: mpsc::UnboundedSender<TaskEvent>,
    }

    #[async_trait]
    impl ClientCallback for RecordingClient {
        async fn on_event(&self, event: TaskEvent) {
            let _ = self.events.send(event);
        }
    }

    struct TestResolver {
        auto_init: bool,
        fail_bootstrap_once: AtomicBool,
        events: mpsc::UnboundedSender<TaskEvent>,
    }

    impl CallbackResolver for TestResolver {
        fn resolve_bootstrap(&self, callback_id: i64) -> Option<Arc<dyn BootstrapCallback>> {
            if self.fail_bootstrap_once.swap(false, Ordering::SeqCst) {
                return None;
            }
            if callback_id != BOOTSTRAP_ID {
                return None;
            }
            if self.auto_init {
                Some(Arc::new(SignalingBootstrap))
            } else {
                Some(Arc::new(SilentBootstrap))
            }
        }

        fn resolve_client(&self, callback_id: i64) -> Option<Arc<dyn ClientCallback>> {
            if callback_id != CLIENT_ID {
                return None;
            }
            Some(Arc::new(RecordingClient {
                events: self.events.clone(),
            }))
        }
    }

    struct FinishLog {
        finished: StdMutex<Vec<String>>,
    }

    impl FinishLog {
        fn snapshot(&self) -> Vec<String> {
            self.finished.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SchedulerHooks for FinishLog {
        async fn finish(&self, task_id: &str) {
            self.finished.lock().unwrap().push(task_id.to_string());
        }
    }

    struct Harness {
        dispatcher: Arc<HeadlessDispatcher>,
        scheduler: Arc<FinishLog>,
        delivered: mpsc::UnboundedReceiver<TaskEvent>,
    }

    fn harness_with(auto_init: bool, fail_bootstrap_once: bool) -> Harness {
        let (events, delivered) = mpsc::unbounded_channel();
        let scheduler = Arc::new(FinishLog {
            finished: StdMutex::new(Vec::new()),
        });
        let resolver = Arc::new(TestResolver {
            auto_init,
            fail_bootstrap_once: AtomicBool::new(fail_bootstrap_once),
            events,
        });
        let dispatcher = HeadlessDispatcher::new(
            Config::default(),
            Arc::new(MemoryStore::new()),
            resolver,
            scheduler.clone(),
        );
        Harness {
            dispatcher,
            scheduler,
            delivered,
        }
    }

    async fn registered_harness(auto_init: bool) -> Harness {
        let h = harness_with(auto_init, false);
        h.dispatcher
            .registrar()
            .register(BOOTSTRAP_ID, CLIENT_ID)
            .await
            .unwrap();
        h
    }

    async fn recv_event(rx: &mut mpsc::UnboundedReceiver<TaskEvent>) -> TaskEvent {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for delivery")
            .expect("delivery channel closed")
    }

    #[tokio::test]
    async fn test_cold_submit_launches_without_immediate_delivery() {
        let mut h = registered_harness(false).await;
        let mut bus_rx = h.dispatcher.bus().subscribe();

        h.dispatcher.on_fire("task-A").await;
        assert_eq!(h.dispatcher.phase().await, Phase::Launching);
        assert!(h.delivered.try_recv().is_err());

        h.dispatcher.acknowledge().await;
        let ev = recv_event(&mut h.delivered).await;
        assert_eq!(
            ev,
            TaskEvent {
                task_id: "task-A".into(),
                timed_out: false
            }
        );
        assert!(h.delivered.try_recv().is_err());

        // The bus surfaces the delivery with the client callback id.
        let delivered = loop {
            let ev = bus_rx.recv().await.unwrap();
            if ev.kind == EventKind::DispatchDelivered {
                break ev;
            }
        };
        assert_eq!(delivered.task.as_deref(), Some("task-A"));
        assert_eq!(delivered.timeout, Some(false));
        assert_eq!(delivered.callback_id, Some(CLIENT_ID));
    }

    #[tokio::test]
    async fn test_queued_requests_drain_in_submission_order() {
        let mut h = registered_harness(false).await;

        h.dispatcher.on_fire("task-A").await;
        h.dispatcher.on_fire("task-B").await;
        assert_eq!(h.dispatcher.phase().await, Phase::Launching);

        h.dispatcher.acknowledge().await;
        assert_eq!(recv_event(&mut h.delivered).await.task_id, "task-A");
        assert_eq!(recv_event(&mut h.delivered).await.task_id, "task-B");
    }

    #[tokio::test]
    async fn test_duplicate_task_ids_are_distinct_deliveries() {
        let mut h = registered_harness(false).await;

        h.dispatcher.on_fire("task-A").await;
        h.dispatcher.on_fire("task-A").await;
        h.dispatcher.acknowledge().await;

        assert_eq!(recv_event(&mut h.delivered).await.task_id, "task-A");
        assert_eq!(recv_event(&mut h.delivered).await.task_id, "task-A");
    }

    #[tokio::test]
    async fn test_ready_submit_delivers_immediately() {
        let mut h = registered_harness(false).await;

        h.dispatcher.on_fire("task-A").await;
        h.dispatcher.acknowledge().await;
        let _ = recv_event(&mut h.delivered).await;

        h.dispatcher.on_deadline("task-B").await;
        let ev = recv_event(&mut h.delivered).await;
        assert_eq!(
            ev,
            TaskEvent {
                task_id: "task-B".into(),
                timed_out: true
            }
        );
    }

    #[tokio::test]
    async fn test_acknowledge_is_idempotent() {
        let mut h = registered_harness(false).await;

        h.dispatcher.on_fire("task-A").await;
        h.dispatcher.acknowledge().await;
        h.dispatcher.acknowledge().await;

        assert_eq!(recv_event(&mut h.delivered).await.task_id, "task-A");
        assert!(h.delivered.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_initialized_signal_drives_ready_transition() {
        let mut h = registered_harness(true).await;

        h.dispatcher.on_fire("task-A").await;
        let ev = recv_event(&mut h.delivered).await;
        assert_eq!(ev.task_id, "task-A");
        assert!(h.dispatcher.is_ready().await);
    }

    #[tokio::test]
    async fn test_launch_failure_resets_and_finishes_then_retries() {
        let mut h = harness_with(false, true);
        h.dispatcher
            .registrar()
            .register(BOOTSTRAP_ID, CLIENT_ID)
            .await
            .unwrap();

        // First attempt: bootstrap resolution fails once.
        h.dispatcher.on_fire("task-A").await;
        assert_eq!(h.dispatcher.phase().await, Phase::Cold);
        assert_eq!(h.scheduler.snapshot(), vec!["task-A".to_string()]);

        // Unrelated submit relaunches successfully.
        h.dispatcher.on_fire("task-B").await;
        assert_eq!(h.dispatcher.phase().await, Phase::Launching);
        h.dispatcher.acknowledge().await;
        assert_eq!(recv_event(&mut h.delivered).await.task_id, "task-B");
        assert_eq!(h.scheduler.snapshot(), vec!["task-A".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_without_registration_finishes_task() {
        let h = harness_with(false, false);

        h.dispatcher.on_fire("task-A").await;
        assert_eq!(h.dispatcher.phase().await, Phase::Cold);
        assert_eq!(h.scheduler.snapshot(), vec!["task-A".to_string()]);
    }

    #[tokio::test]
    async fn test_ready_listeners_fire_once_in_order_late_is_noop() {
        let h = registered_harness(false).await;
        let order = Arc::new(StdMutex::new(Vec::new()));

        for i in 0..2 {
            let order = order.clone();
            h.dispatcher
                .on_context_ready(move |_ctx| order.lock().unwrap().push(i));
        }

        h.dispatcher.on_fire("task-A").await;
        h.dispatcher.acknowledge().await;
        assert_eq!(*order.lock().unwrap(), vec![0, 1]);

        let order_late = order.clone();
        h.dispatcher
            .on_context_ready(move |_ctx| order_late.lock().unwrap().push(99));
        assert_eq!(*order.lock().unwrap(), vec![0, 1]);
        assert!(h.dispatcher.is_ready().await);
    }

    #[tokio::test]
    async fn test_concurrent_cold_submits_create_one_context() {
        let mut h = registered_harness(false).await;
        let mut bus_rx = h.dispatcher.bus().subscribe();

        let d1 = h.dispatcher.clone();
        let d2 = h.dispatcher.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move { d1.on_fire("task-A").await }),
            tokio::spawn(async move { d2.on_fire("task-B").await }),
        );
        a.unwrap();
        b.unwrap();

        h.dispatcher.acknowledge().await;
        let mut got = vec![
            recv_event(&mut h.delivered).await.task_id,
            recv_event(&mut h.delivered).await.task_id,
        ];
        got.sort();
        assert_eq!(got, vec!["task-A".to_string(), "task-B".to_string()]);

        // Exactly one launch was attempted.
        let mut launches = 0;
        while let Ok(ev) = bus_rx.try_recv() {
            if ev.kind == EventKind::ContextLaunching {
                launches += 1;
            }
        }
        assert_eq!(launches, 1);
    }
}

//! # Background context launcher.
//!
//! [`Launcher`] turns a persisted bootstrap identifier into a running
//! background context: it resolves the identifier, spawns the context event
//! loop on the runtime, runs the bootstrap callback inside it, then serves
//! dispatch messages by resolving and invoking the client callback.
//!
//! ## Architecture
//! ```text
//! launch(bootstrap_id)
//!     │ resolve_bootstrap ── None ──► Err(CallbackResolution)   (caller cleans up)
//!     ▼
//! tokio::spawn(run_context)
//!     │
//!     ├─► bootstrap.run(handle) ──► handle.notify_initialized()
//!     │                                   │ ContextSignal::Initialized
//!     │                                   ▼ (dispatcher acknowledges)
//!     └─► loop: recv(DispatchMessage)
//!            ├─ resolve_client ── None ──► finish(task_id)
//!            └─ client.on_event(TaskEvent)   (panic-isolated)
//!                    └─ panic ──► finish(task_id)
//! ```
//!
//! ## Rules
//! - **One context per process**: a second `launch` while one exists logs a
//!   warning and returns the existing handle with no fresh signal stream.
//! - **Asynchronous readiness**: `launch` returns before the context is
//!   usable; the `Initialized` signal drives the ready transition.
//! - **Panic isolation**: a panicking callback never kills the event loop;
//!   the owning task is finished so the scheduler slot is not leaked.
//! - **No teardown**: once started the context lives until process death.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, warn};

use crate::context::channel::{
    DispatchMessage, ExecutionContext, SignalReceiver, notification_channel,
};
use crate::context::{BootstrapCallback, CallbackResolver, ContextHandle, TaskEvent};
use crate::error::DispatchError;
use crate::scheduler::SchedulerHooks;

/// Result of a launch call.
#[derive(Debug)]
pub(crate) struct LaunchOutcome {
    /// Handle to the (possibly pre-existing) context.
    pub(crate) context: ExecutionContext,
    /// Signal stream of the freshly created context; `None` when the call
    /// was a no-op because a context already existed.
    pub(crate) signals: Option<SignalReceiver>,
}

/// Creates and owns the singleton background context.
pub(crate) struct Launcher {
    resolver: Arc<dyn CallbackResolver>,
    scheduler: Arc<dyn SchedulerHooks>,
    current: Mutex<Option<ExecutionContext>>,
}

impl Launcher {
    pub(crate) fn new(
        resolver: Arc<dyn CallbackResolver>,
        scheduler: Arc<dyn SchedulerHooks>,
    ) -> Self {
        Self {
            resolver,
            scheduler,
            current: Mutex::new(None),
        }
    }

    /// Starts the background context bound to `bootstrap_id`.
    ///
    /// Resolution failure is returned as
    /// [`DispatchError::CallbackResolution`]; the caller owns the cleanup
    /// (finishing the triggering task, resetting its state machine). On
    /// success the context is live but not yet ready; readiness arrives
    /// later on the returned signal stream.
    pub(crate) async fn launch(&self, bootstrap_id: i64) -> Result<LaunchOutcome, DispatchError> {
        let mut current = self.current.lock().await;
        if let Some(ctx) = current.as_ref() {
            warn!("background context already started");
            return Ok(LaunchOutcome {
                context: ctx.clone(),
                signals: None,
            });
        }

        let bootstrap = self
            .resolver
            .resolve_bootstrap(bootstrap_id)
            .ok_or(DispatchError::CallbackResolution {
                callback_id: bootstrap_id,
            })?;

        let (context, dispatch_rx, handle, signals) = notification_channel();
        tokio::spawn(run_context(
            bootstrap,
            handle,
            dispatch_rx,
            Arc::clone(&self.resolver),
            Arc::clone(&self.scheduler),
        ));
        *current = Some(context.clone());

        Ok(LaunchOutcome {
            context,
            signals: Some(signals),
        })
    }
}

/// The context event loop: bootstrap first, then serve dispatches forever.
async fn run_context(
    bootstrap: Arc<dyn BootstrapCallback>,
    handle: ContextHandle,
    mut dispatch_rx: mpsc::UnboundedReceiver<DispatchMessage>,
    resolver: Arc<dyn CallbackResolver>,
    scheduler: Arc<dyn SchedulerHooks>,
) {
    debug!("background context starting");

    let boot = bootstrap.run(handle);
    if std::panic::AssertUnwindSafe(boot).catch_unwind().await.is_err() {
        // The context may never signal readiness now; queued requests stay
        // pending until the process is recycled, matching a bootstrap that
        // hangs for any other reason.
        error!("bootstrap callback panicked");
    }

    while let Some(msg) = dispatch_rx.recv().await {
        let Some(client) = resolver.resolve_client(msg.client_id) else {
            error!(callback_id = msg.client_id, "failed to resolve client callback");
            scheduler.finish(&msg.task_id).await;
            continue;
        };

        let task_id = msg.task_id.clone();
        let fut = client.on_event(TaskEvent {
            task_id: msg.task_id,
            timed_out: msg.timed_out,
        });
        if std::panic::AssertUnwindSafe(fut).catch_unwind().await.is_err() {
            error!(task = %task_id, "client callback panicked");
            scheduler.finish(&task_id).await;
        }
    }
}

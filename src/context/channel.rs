//! # Notification channel between dispatcher and background context.
//!
//! A two-way path bound to one context:
//! - inbound: [`DispatchMessage`]s from the dispatcher into the context's
//!   event loop (unbounded, so delivery never blocks a submitter)
//! - outbound: [`ContextSignal`]s from code running inside the context back
//!   to the dispatcher (currently only `Initialized`)
//!
//! [`ExecutionContext`] is the dispatcher-side handle; [`ContextHandle`] is
//! handed to the bootstrap callback inside the context.

use tokio::sync::mpsc;

use crate::error::DispatchError;

/// Wire shape of one delivery into the context.
///
/// The context event loop resolves `client_id` and invokes the callback with
/// the task identifier.
#[derive(Clone, Debug)]
pub(crate) struct DispatchMessage {
    /// The client callback to look up and invoke.
    pub(crate) client_id: i64,
    /// Identifier of the task that fired.
    pub(crate) task_id: String,
    /// Deadline rather than fetch.
    pub(crate) timed_out: bool,
}

/// Signal emitted by code running inside the context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ContextSignal {
    /// Bootstrap finished wiring handlers; dispatch may begin.
    Initialized,
}

pub(crate) type SignalReceiver = mpsc::UnboundedReceiver<ContextSignal>;

/// Dispatcher-side handle to a running background context.
///
/// Cloneable; all clones deliver into the same context. Created exactly once
/// per process lifetime by the launcher.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    dispatch_tx: mpsc::UnboundedSender<DispatchMessage>,
}

impl ExecutionContext {
    /// Sends one dispatch message into the context event loop.
    ///
    /// Never blocks. Fails only when the context task is gone, which the
    /// state machine treats as an invariant violation.
    pub(crate) fn deliver(&self, msg: DispatchMessage) -> Result<(), DispatchError> {
        self.dispatch_tx
            .send(msg)
            .map_err(|_| DispatchError::ChannelUnavailable)
    }
}

/// Context-side handle given to the bootstrap callback.
#[derive(Clone, Debug)]
pub struct ContextHandle {
    signal_tx: mpsc::UnboundedSender<ContextSignal>,
}

impl ContextHandle {
    /// Signals that channel handlers are wired and dispatch may begin.
    ///
    /// Safe to call more than once; the dispatcher's ready transition is
    /// idempotent.
    pub fn notify_initialized(&self) {
        let _ = self.signal_tx.send(ContextSignal::Initialized);
    }
}

/// Builds the channel pair for a fresh context.
pub(crate) fn notification_channel() -> (
    ExecutionContext,
    mpsc::UnboundedReceiver<DispatchMessage>,
    ContextHandle,
    SignalReceiver,
) {
    let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    (
        ExecutionContext { dispatch_tx },
        dispatch_rx,
        ContextHandle { signal_tx },
        signal_rx,
    )
}

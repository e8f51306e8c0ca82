//! # Callback abstractions run inside the background context.
//!
//! This module defines the two callback traits (async) and the resolver that
//! turns a persisted 64-bit identifier back into runnable code:
//! - [`BootstrapCallback`] - runs once when the context starts, wires channel
//!   handlers, then signals readiness
//! - [`ClientCallback`] - invoked once per delivered task event
//! - [`CallbackResolver`] - identifier → callback lookup
//!
//! A resolver lookup failure is how a stale or corrupted registration shows
//! up at launch time; the launcher converts it into
//! [`CallbackResolution`](crate::DispatchError::CallbackResolution) instead
//! of letting it escape into scheduler bookkeeping.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::ContextHandle;

/// One occurrence of a scheduled task firing, as seen by the client callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskEvent {
    /// Identifier of the scheduled task that triggered this event.
    pub task_id: String,
    /// `true` when the delivery represents a deadline rather than a fetch.
    pub timed_out: bool,
}

/// # Code run once when the background context starts.
///
/// Executed before any dispatch is served. The implementation must call
/// [`ContextHandle::notify_initialized`] once its channel handlers are wired;
/// queued dispatch requests are held back until then.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use fetchvisor::{BootstrapCallback, ContextHandle};
///
/// struct Bootstrap;
///
/// #[async_trait]
/// impl BootstrapCallback for Bootstrap {
///     async fn run(&self, handle: ContextHandle) {
///         // wire application channels...
///         handle.notify_initialized();
///     }
/// }
/// ```
#[async_trait]
pub trait BootstrapCallback: Send + Sync + 'static {
    /// Performs context setup, then signals readiness through `handle`.
    async fn run(&self, handle: ContextHandle);
}

/// # The user-registered function invoked per delivered task.
#[async_trait]
pub trait ClientCallback: Send + Sync + 'static {
    /// Handles one fetch or timeout event.
    async fn on_event(&self, event: TaskEvent);
}

/// Identifier → callback lookup.
///
/// The analogue of the embedding's callback-information table: identifiers
/// persisted at registration time are resolved back to runnable code when
/// the background context launches.
pub trait CallbackResolver: Send + Sync + 'static {
    /// Resolves the bootstrap identifier, or `None` when unknown.
    fn resolve_bootstrap(&self, callback_id: i64) -> Option<Arc<dyn BootstrapCallback>>;

    /// Resolves the client identifier, or `None` when unknown.
    fn resolve_client(&self, callback_id: i64) -> Option<Arc<dyn ClientCallback>>;
}

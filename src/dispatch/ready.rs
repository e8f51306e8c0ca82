//! # Broadcast-once registry of context-ready listeners.
//!
//! Other subsystems attach their own channels to the freshly created
//! background context. They register a callback here; when the dispatcher
//! transitions to ready, every callback currently registered is invoked
//! exactly once, in insertion order, and the collection is cleared.
//!
//! ## Rules
//! - **Insertion order is delivery order.**
//! - **Single fire**: callbacks registered after the drain are a documented
//!   no-op for this mechanism - a consumer that needs ready-or-will-become-
//!   ready semantics must check
//!   [`HeadlessDispatcher::is_ready`](crate::HeadlessDispatcher::is_ready)
//!   itself.
//! - Registration is synchronized and may race with the drain; whichever
//!   side takes the lock first wins.

use std::sync::Mutex;

use crate::context::ExecutionContext;

type ReadyFn = Box<dyn FnOnce(&ExecutionContext) + Send>;

/// Ordered, drain-once collection of ready listeners.
#[derive(Default)]
pub(crate) struct ReadyListeners {
    inner: Mutex<Vec<ReadyFn>>,
}

impl ReadyListeners {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a listener. No effect on listeners already drained.
    pub(crate) fn push(&self, f: ReadyFn) {
        self.inner.lock().expect("ready listeners poisoned").push(f);
    }

    /// Invokes every registered listener in insertion order and clears the
    /// collection.
    pub(crate) fn drain(&self, ctx: &ExecutionContext) {
        let drained: Vec<ReadyFn> = {
            let mut g = self.inner.lock().expect("ready listeners poisoned");
            std::mem::take(&mut *g)
        };
        for f in drained {
            f(ctx);
        }
    }
}

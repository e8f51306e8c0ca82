//! # Runtime events emitted by the registrar, dispatcher and launcher.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Registration events**: stored / rejected / cleared.
//! - **Dispatch events**: queued, delivered, dropped.
//! - **Context lifecycle events**: launching, ready, launch failure.
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! task identifier, failure reasons and the callback identifier involved.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use fetchvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::DispatchDelivered)
//!     .with_task("flutter_background_fetch")
//!     .with_timeout(false);
//!
//! assert_eq!(ev.kind, EventKind::DispatchDelivered);
//! assert_eq!(ev.task.as_deref(), Some("flutter_background_fetch"));
//! assert_eq!(ev.timeout, Some(false));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registration events ===
    /// A registration record was persisted.
    ///
    /// Sets:
    /// - `callback_id`: the client callback identifier
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RegistrationStored,

    /// A registration attempt was rejected (record already exists and the
    /// policy disallows overwrite).
    ///
    /// Sets:
    /// - `reason`: rejection label
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RegistrationRejected,

    /// The registration record was removed.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RegistrationCleared,

    // === Dispatch events ===
    /// A request arrived before the context was ready and was queued.
    ///
    /// Sets:
    /// - `task`: task identifier
    /// - `timeout`: whether the request represents a deadline
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DispatchQueued,

    /// A request was delivered to the client callback inside the context.
    ///
    /// This is the structured `{taskId, timeout}` surface consumed by the
    /// event collaborator.
    ///
    /// Sets:
    /// - `task`: task identifier
    /// - `timeout`: whether the delivery represents a deadline
    /// - `callback_id`: the client callback identifier
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DispatchDelivered,

    /// A request was discarded; the owning task was finished on the
    /// scheduler side.
    ///
    /// Sets:
    /// - `task`: task identifier
    /// - `reason`: why the request could not be delivered
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DispatchDropped,

    // === Context lifecycle events ===
    /// Context creation started (first request while cold).
    ///
    /// Sets:
    /// - `task`: identifier of the triggering task
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ContextLaunching,

    /// The context acknowledged initialization; queued requests drained.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ContextReady,

    /// A launch attempt failed; the dispatcher reset to cold.
    ///
    /// Sets:
    /// - `task`: identifier of the triggering task
    /// - `reason`: failure message
    /// - `callback_id`: the identifier that failed to resolve, if any
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    LaunchFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Task identifier, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, drop details, etc.).
    pub reason: Option<Arc<str>>,
    /// Whether the dispatch represents a deadline rather than a fetch.
    pub timeout: Option<bool>,
    /// Callback identifier involved, if applicable.
    pub callback_id: Option<i64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            task: None,
            reason: None,
            timeout: None,
            callback_id: None,
        }
    }

    /// Attaches a task identifier.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Marks the event as a fetch (`false`) or deadline (`true`) dispatch.
    #[inline]
    pub fn with_timeout(mut self, timeout: bool) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches the callback identifier involved.
    #[inline]
    pub fn with_callback_id(mut self, callback_id: i64) -> Self {
        self.callback_id = Some(callback_id);
        self
    }
}

//! One firing of a scheduled task awaiting delivery.

/// A dispatch request created when the external scheduler fires.
///
/// The same `task_id` may recur across separate dispatch cycles; each firing
/// is a distinct request and a distinct delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Identifier of the scheduled task that triggered this event.
    pub task_id: String,
    /// `true` when this delivery represents a deadline rather than a fetch.
    pub timed_out: bool,
}

impl DispatchRequest {
    /// A normal fetch signal.
    pub fn fetch(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            timed_out: false,
        }
    }

    /// A deadline/timeout signal.
    pub fn deadline(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            timed_out: true,
        }
    }
}

//! Seam to the platform scheduler collaborator.
//!
//! The runtime never talks to the OS job scheduler directly. It only needs
//! one thing from it: releasing the slot held for a fired task once the
//! corresponding dispatch request has been discarded. Scheduling itself
//! (intervals, network/battery/idle/storage constraints) is configuration
//! handled outside this crate.

use async_trait::async_trait;

/// Callbacks into the external scheduler.
///
/// `finish` must be invoked exactly once for every dispatch request the
/// runtime discards; skipping it leaks a scheduler-held wake resource.
#[async_trait]
pub trait SchedulerHooks: Send + Sync + 'static {
    /// Releases the scheduler-held slot for `task_id`.
    async fn finish(&self, task_id: &str);
}

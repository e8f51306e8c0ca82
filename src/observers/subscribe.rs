//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers
//! into the runtime: metrics sinks, audit logs, or the event surface a host
//! application exposes to its users.
//!
//! ## Contract
//! - Subscribers run on their own spawned listener task fed from the bus;
//!   a slow subscriber lags and skips events, it never blocks a publisher.
//! - Implementations should avoid blocking the async runtime (prefer async
//!   I/O and cooperative waits).

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Spawns a listener task that feeds `subscriber` from `rx`.
///
/// The task exits when the bus is dropped. Lagged events are skipped, which
/// is acceptable for observability consumers.
pub fn spawn_listener(
    subscriber: std::sync::Arc<dyn Subscribe>,
    mut rx: tokio::sync::broadcast::Receiver<Event>,
) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => subscriber.on_event(&ev).await,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(name = subscriber.name(), skipped, "subscriber lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

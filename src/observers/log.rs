//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [registered] callback=200
//! [launching] task=flutter_background_fetch
//! [queued] task=flutter_background_fetch timeout=false
//! [ready]
//! [delivered] task=flutter_background_fetch timeout=false callback=200
//! [dropped] task=flutter_background_fetch reason=callback_resolution_failed
//! [launch-failed] task=flutter_background_fetch reason="failed to resolve callback: 100"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::observers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use -
/// implement a custom [`Subscribe`] for structured logging or metrics
/// collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::RegistrationStored => {
                println!("[registered] callback={:?}", e.callback_id);
            }
            EventKind::RegistrationRejected => {
                println!("[registration-rejected] reason={:?}", e.reason);
            }
            EventKind::RegistrationCleared => {
                println!("[registration-cleared]");
            }
            EventKind::DispatchQueued => {
                println!("[queued] task={:?} timeout={:?}", e.task, e.timeout);
            }
            EventKind::DispatchDelivered => {
                println!(
                    "[delivered] task={:?} timeout={:?} callback={:?}",
                    e.task, e.timeout, e.callback_id
                );
            }
            EventKind::DispatchDropped => {
                println!("[dropped] task={:?} reason={:?}", e.task, e.reason);
            }
            EventKind::ContextLaunching => {
                println!("[launching] task={:?}", e.task);
            }
            EventKind::ContextReady => {
                println!("[ready]");
            }
            EventKind::LaunchFailed => {
                println!("[launch-failed] task={:?} reason={:?}", e.task, e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}

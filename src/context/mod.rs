//! # Background execution context.
//!
//! This module provides everything around the singleton background context:
//! - [`BootstrapCallback`], [`ClientCallback`], [`CallbackResolver`],
//!   [`TaskEvent`] - the callback seams
//! - [`ExecutionContext`], [`ContextHandle`] - the two ends of the
//!   notification channel
//! - the launcher (crate-internal) that starts the context exactly once

mod callbacks;
mod channel;
mod launcher;

pub use callbacks::{BootstrapCallback, CallbackResolver, ClientCallback, TaskEvent};
pub use channel::{ContextHandle, ExecutionContext};

pub(crate) use channel::{ContextSignal, DispatchMessage, SignalReceiver};
pub(crate) use launcher::Launcher;

#[cfg(test)]
pub(crate) use channel::notification_channel;

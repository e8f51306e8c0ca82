//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the registrar, the
//! headless dispatcher and the context launcher.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Registrar`, `HeadlessDispatcher`, `Launcher`.
//! - **Consumers**: the embedding application's event surface (every
//!   successful delivery shows up as `DispatchDelivered {task, timeout}`),
//!   and the optional `LogWriter` (feature `logging`).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

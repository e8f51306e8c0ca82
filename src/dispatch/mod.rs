//! # Headless dispatch pipeline.
//!
//! This module provides the core delivery machinery:
//! - [`DispatchRequest`] - one firing of a scheduled task
//! - [`HeadlessDispatcher`], [`Phase`] - the readiness state machine and
//!   FIFO replay queue
//! - the broadcast-once ready-listener registry (crate-internal)

mod dispatcher;
mod ready;
mod request;

pub use dispatcher::{HeadlessDispatcher, Phase};
pub use request::DispatchRequest;

//! # Event observers.
//!
//! - [`Subscribe`] - trait for custom event consumers
//! - [`spawn_listener`] - feeds a subscriber from a bus receiver
//! - `LogWriter` - built-in stdout logger (feature `logging`)

mod subscribe;

pub use subscribe::{Subscribe, spawn_listener};

#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;

//! # Registration persistence.
//!
//! This module provides the registration-related types:
//! - [`RegistrationRecord`] - the persisted callback-identifier pair
//! - [`RegistrationStore`] - trait for pluggable persistence backends
//! - [`MemoryStore`] - volatile backend for tests and embeddings
//! - [`JsonFileStore`] - durable backend with atomic replace-on-write
//! - [`Registrar`], [`RegistrationPolicy`] - policy-applying front

mod file;
mod memory;
mod record;
mod registrar;
mod store;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::RegistrationRecord;
pub use registrar::{Registrar, RegistrationPolicy};
pub use store::RegistrationStore;

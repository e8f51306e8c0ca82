//! In-memory registration store.
//!
//! Useful for tests and for embeddings that manage durability themselves.
//! Thread-safe and cloneable - multiple references share the same state.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::{RegistrationRecord, RegistrationStore};

/// Volatile store backed by a shared `Option<RegistrationRecord>`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Option<RegistrationRecord>>>,
}

impl MemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn load(&self) -> Result<Option<RegistrationRecord>, StoreError> {
        Ok(*self.inner.lock().await)
    }

    async fn save(&self, record: RegistrationRecord) -> Result<(), StoreError> {
        *self.inner.lock().await = Some(record);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.inner.lock().await = None;
        Ok(())
    }
}

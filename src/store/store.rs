//! # Registration store trait.
//!
//! `RegistrationStore` is the injected persistence capability: the runtime
//! needs only get/set/clear of a single two-field record and stays agnostic
//! of the backing medium (file, preferences namespace, test double).
//!
//! ## Contract
//! - `save` persists the record as **one atomic transaction**: a crash
//!   between the two identifiers must never leave `load` returning a
//!   partially-set record.
//! - `load` returns `None` when no headless task is registered.
//! - The dispatcher reads the record at most once per cold start and treats
//!   it as immutable for the rest of the process lifetime.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::store::RegistrationRecord;

/// Persistence capability for the registration record.
///
/// Implementations must be safe to call from multiple tasks concurrently.
#[async_trait]
pub trait RegistrationStore: Send + Sync + 'static {
    /// Returns the persisted record, or `None` when nothing is registered.
    async fn load(&self) -> Result<Option<RegistrationRecord>, StoreError>;

    /// Persists the record atomically, replacing any previous one.
    async fn save(&self, record: RegistrationRecord) -> Result<(), StoreError>;

    /// Removes the persisted record, if any.
    async fn clear(&self) -> Result<(), StoreError>;
}

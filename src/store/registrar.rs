//! # Registration front: policy enforcement over a [`RegistrationStore`].
//!
//! [`Registrar`] is the single entry point for creating and clearing the
//! headless registration. It applies the configured
//! [`RegistrationPolicy`] and publishes registration events on the bus.
//!
//! ## Rules
//! - At most one registration record exists at a time.
//! - Under [`RegistrationPolicy::Reject`] (the default) a second `register`
//!   fails with [`DispatchError::AlreadyRegistered`] (fail closed).
//! - Under [`RegistrationPolicy::Overwrite`] a second `register` replaces
//!   the previous record.
//! - Both identifiers are persisted in one atomic store transaction.

use std::sync::Arc;

use crate::error::DispatchError;
use crate::events::{Bus, Event, EventKind};
use crate::store::{RegistrationRecord, RegistrationStore};

/// What to do when `register` finds an existing record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegistrationPolicy {
    /// Refuse the new registration (fail closed).
    #[default]
    Reject,
    /// Clear the previous record and accept the new one.
    Overwrite,
}

/// Policy-applying registration front.
pub struct Registrar {
    store: Arc<dyn RegistrationStore>,
    policy: RegistrationPolicy,
    bus: Bus,
}

impl Registrar {
    /// Creates a registrar over `store` with the given policy.
    pub fn new(store: Arc<dyn RegistrationStore>, policy: RegistrationPolicy, bus: Bus) -> Self {
        Self { store, policy, bus }
    }

    /// Registers the headless callback pair.
    ///
    /// Persists `(bootstrap_id, client_id)` atomically. Returns
    /// [`DispatchError::AlreadyRegistered`] when a record exists and the
    /// policy is [`RegistrationPolicy::Reject`]; store failures surface as
    /// [`DispatchError::MalformedPayload`].
    pub async fn register(&self, bootstrap_id: i64, client_id: i64) -> Result<(), DispatchError> {
        if self.store.load().await?.is_some() {
            match self.policy {
                RegistrationPolicy::Reject => {
                    self.bus.publish(
                        Event::new(EventKind::RegistrationRejected)
                            .with_reason(DispatchError::AlreadyRegistered.as_label()),
                    );
                    return Err(DispatchError::AlreadyRegistered);
                }
                RegistrationPolicy::Overwrite => {
                    self.store.clear().await?;
                    self.bus.publish(Event::new(EventKind::RegistrationCleared));
                }
            }
        }
        self.store
            .save(RegistrationRecord::new(bootstrap_id, client_id))
            .await?;
        self.bus
            .publish(Event::new(EventKind::RegistrationStored).with_callback_id(client_id));
        Ok(())
    }

    /// Removes the registration record, if any.
    pub async fn clear(&self) -> Result<(), DispatchError> {
        self.store.clear().await?;
        self.bus.publish(Event::new(EventKind::RegistrationCleared));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registrar(policy: RegistrationPolicy) -> (Registrar, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let reg = Registrar::new(store.clone(), policy, Bus::new(16));
        (reg, store)
    }

    #[tokio::test]
    async fn test_register_then_load_returns_exact_pair() {
        let (reg, store) = registrar(RegistrationPolicy::Reject);
        reg.register(100, 200).await.unwrap();
        assert_eq!(
            store.load().await.unwrap(),
            Some(RegistrationRecord::new(100, 200))
        );
    }

    #[tokio::test]
    async fn test_reject_policy_refuses_second_registration() {
        let (reg, store) = registrar(RegistrationPolicy::Reject);
        reg.register(100, 200).await.unwrap();

        let err = reg.register(300, 400).await.unwrap_err();
        assert_eq!(err.as_label(), "headless_already_registered");
        // Original pair untouched.
        assert_eq!(
            store.load().await.unwrap(),
            Some(RegistrationRecord::new(100, 200))
        );
    }

    #[tokio::test]
    async fn test_overwrite_policy_replaces_record() {
        let (reg, store) = registrar(RegistrationPolicy::Overwrite);
        reg.register(100, 200).await.unwrap();
        reg.register(300, 400).await.unwrap();
        assert_eq!(
            store.load().await.unwrap(),
            Some(RegistrationRecord::new(300, 400))
        );
    }

    #[tokio::test]
    async fn test_clear_allows_re_registration_under_reject() {
        let (reg, _store) = registrar(RegistrationPolicy::Reject);
        reg.register(100, 200).await.unwrap();
        reg.clear().await.unwrap();
        reg.register(300, 400).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejection_publishes_event() {
        let store: Arc<dyn RegistrationStore> = Arc::new(MemoryStore::new());
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let reg = Registrar::new(store, RegistrationPolicy::Reject, bus);

        reg.register(1, 2).await.unwrap();
        assert!(reg.register(3, 4).await.is_err());

        let stored = rx.recv().await.unwrap();
        assert_eq!(stored.kind, EventKind::RegistrationStored);
        let rejected = rx.recv().await.unwrap();
        assert_eq!(rejected.kind, EventKind::RegistrationRejected);
    }
}

//! The persisted registration record.

use serde::{Deserialize, Serialize};

/// The pair of callback identifiers persisted by a headless registration.
///
/// Both fields are written atomically as one record: a store must never let
/// a reader observe one identifier without the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    /// Identifies the function run once when the background context starts,
    /// before any dispatch, to wire channel handlers.
    #[serde(rename = "registrationCallbackId")]
    pub bootstrap_id: i64,
    /// Identifies the user-supplied function invoked for every dispatched
    /// task.
    #[serde(rename = "clientCallbackId")]
    pub client_id: i64,
}

impl RegistrationRecord {
    /// Creates a record from the two callback identifiers.
    pub fn new(bootstrap_id: i64, client_id: i64) -> Self {
        Self {
            bootstrap_id,
            client_id,
        }
    }
}

//! # Global runtime configuration.
//!
//! [`Config`] defines the dispatcher's behavior: the registration policy
//! and the event-bus capacity.
//!
//! # Example
//! ```
//! use fetchvisor::{Config, RegistrationPolicy};
//!
//! let mut cfg = Config::default();
//! cfg.policy = RegistrationPolicy::Overwrite;
//! cfg.bus_capacity = 256;
//!
//! assert_eq!(cfg.policy, RegistrationPolicy::Overwrite);
//! ```

use crate::store::RegistrationPolicy;

/// Global configuration for the dispatch runtime.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// What `register` does when a record already exists.
    pub policy: RegistrationPolicy,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `policy = RegistrationPolicy::Reject` (fail closed)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            policy: RegistrationPolicy::default(),
            bus_capacity: 1024,
        }
    }
}

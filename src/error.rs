//! Error types used by the dispatch runtime and the registration store.
//!
//! This module defines two main error enums:
//!
//! - [`DispatchError`] — errors raised by registration and the headless
//!   dispatch path.
//! - [`StoreError`] — errors raised by a [`RegistrationStore`](crate::store::RegistrationStore)
//!   backend.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use thiserror::Error;

/// # Errors produced by registration and dispatch.
///
/// None of these are fatal to the host process: registration failures are
/// surfaced to the caller as structured responses, and dispatch-path failures
/// are contained and converted into a `finish` cleanup for the scheduler.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A registration record already exists and the policy rejects overwrite.
    #[error("only one headless task may be registered")]
    AlreadyRegistered,

    /// The bootstrap or client callback identifier could not be resolved to
    /// runnable code. Fatal to the current launch attempt only.
    #[error("failed to resolve callback {callback_id}")]
    CallbackResolution {
        /// The identifier that failed to resolve.
        callback_id: i64,
    },

    /// A dispatch message could not be built or persisted state was unusable.
    #[error("malformed dispatch payload: {detail}")]
    MalformedPayload {
        /// What was wrong with the payload or state.
        detail: String,
    },

    /// The notification channel was used before the context became ready,
    /// or after its receiving side was dropped. The state machine is
    /// supposed to make this unreachable.
    #[error("notification channel unavailable")]
    ChannelUnavailable,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fetchvisor::DispatchError;
    ///
    /// let err = DispatchError::AlreadyRegistered;
    /// assert_eq!(err.as_label(), "headless_already_registered");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::AlreadyRegistered => "headless_already_registered",
            DispatchError::CallbackResolution { .. } => "callback_resolution_failed",
            DispatchError::MalformedPayload { .. } => "malformed_dispatch_payload",
            DispatchError::ChannelUnavailable => "channel_unavailable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::AlreadyRegistered => {
                "only one headless task may be registered".to_string()
            }
            DispatchError::CallbackResolution { callback_id } => {
                format!("failed to resolve callback: {callback_id}")
            }
            DispatchError::MalformedPayload { detail } => format!("malformed payload: {detail}"),
            DispatchError::ChannelUnavailable => "notification channel unavailable".to_string(),
        }
    }
}

impl From<StoreError> for DispatchError {
    /// A store failure observed on the dispatch path is reported as a
    /// malformed-payload condition: the request cannot be built from the
    /// persisted state, and the owning task must be finished.
    fn from(err: StoreError) -> Self {
        DispatchError::MalformedPayload {
            detail: err.as_message(),
        }
    }
}

/// # Errors produced by a registration store backend.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying I/O failure while reading or writing the record.
    #[error("store i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted record exists but could not be decoded.
    #[error("corrupt registration record: {detail}")]
    Corrupt {
        /// Decode failure details.
        detail: String,
    },
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Io(_) => "store_io",
            StoreError::Corrupt { .. } => "store_corrupt",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StoreError::Io(e) => format!("i/o: {e}"),
            StoreError::Corrupt { detail } => format!("corrupt record: {detail}"),
        }
    }
}

use thiserror::Error;

use crate::storage::StorageError;

/// Failures of the device-authorization flow and session handling.
///
/// `authorization_pending` and `slow_down` never surface here; they are
/// polling control signals (see [`super::DeviceCodePoll`]).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Identity provider discovery failed with status {status}")]
    Discovery { status: u16 },
    #[error("Device authorization request failed with status {status}")]
    AuthorizationRequest { status: u16 },
    #[error("Device code expired before it was approved")]
    Expired,
    #[error("Access denied by the user")]
    Denied,
    #[error("Timed out after {waited_secs}s waiting for approval")]
    Timeout { waited_secs: u64 },
    #[error("Unexpected response from identity provider: {0}")]
    Protocol(String),
    #[error("Session exchange failed with status {status}: {message}")]
    Exchange { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Serialization(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

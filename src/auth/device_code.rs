use std::time::Duration;

use serde::Deserialize;
use strum::Display;

/// Poll interval used when the server does not advertise one.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Device authorization response (RFC 8628 §3.2).
///
/// # Example
/// ```
/// use convex_deck::auth::DeviceAuthorization;
///
/// let authz = DeviceAuthorization {
///     device_code: "device-123".to_string(),
///     user_code: "ABCD-EFGH".to_string(),
///     verification_uri: "https://auth.example.com/activate".to_string(),
///     verification_uri_complete: None,
///     expires_in: 900,
///     interval: 5,
/// };
/// assert_eq!(authz.browser_uri(), "https://auth.example.com/activate");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceAuthorization {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    #[serde(default)]
    pub verification_uri_complete: Option<String>,
    pub expires_in: u64,
    #[serde(default = "default_interval")]
    pub interval: u64,
}

impl DeviceAuthorization {
    /// URI to open in a browser; prefers the one with the code embedded.
    pub fn browser_uri(&self) -> &str {
        self.verification_uri_complete
            .as_deref()
            .unwrap_or(&self.verification_uri)
    }

    /// Advertised interval; zero falls back to the RFC 8628 default.
    pub fn poll_interval(&self) -> Duration {
        match self.interval {
            0 => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}

fn default_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

/// Token issued by the identity provider once the user approves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OidcToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Outcome of a single token-endpoint request.
#[derive(Debug, Clone)]
pub enum DeviceCodePoll {
    Pending,
    SlowDown,
    Authorized { token: OidcToken },
    Denied,
    Expired,
}

/// Phases of one authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AuthPhase {
    Idle,
    DiscoveringEndpoints,
    AuthorizationRequested,
    Polling,
    TokenObtained,
    Expired,
    Denied,
    Failed,
}

impl AuthPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::TokenObtained | Self::Expired | Self::Denied | Self::Failed
        )
    }
}

/// How the poll interval reacts to `slow_down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlowDownPolicy {
    /// Add five seconds to the interval for every `slow_down` (RFC 8628 §3.5).
    #[default]
    Rfc8628,
    /// Keep polling at the advertised interval.
    Fixed,
}

impl SlowDownPolicy {
    pub fn next_interval(self, current: Duration) -> Duration {
        match self {
            Self::Rfc8628 => current + Duration::from_secs(5),
            Self::Fixed => current,
        }
    }
}

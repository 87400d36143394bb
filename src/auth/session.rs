//! Vendor session credential.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Sessions are treated as expired this many seconds before their real expiry.
pub const EXPIRY_MARGIN_SECS: i64 = 300;

/// Bearer credential for the vendor API.
///
/// # Example
/// ```
/// use convex_deck::auth::Session;
/// use chrono::{Duration, Utc};
///
/// let session = Session {
///     access_token: "access".to_string(),
///     token_type: "Bearer".to_string(),
///     expires_at: Some(Utc::now() + Duration::hours(1)),
///     refresh_token: None,
/// };
/// assert!(!session.is_expired());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Sessions without an expiry never expire here; only a rejected API
    /// call can invalidate them.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at - Duration::seconds(EXPIRY_MARGIN_SECS),
            None => false,
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<DateTime<Utc>>) -> Session {
        Session {
            access_token: "access".into(),
            token_type: "Bearer".into(),
            expires_at,
            refresh_token: None,
        }
    }

    #[test]
    fn past_expiry_is_expired() {
        let now = Utc::now();
        assert!(session(Some(now - Duration::seconds(1))).is_expired_at(now));
        assert!(session(Some(now - Duration::days(30))).is_expired_at(now));
    }

    #[test]
    fn expiry_inside_margin_is_expired() {
        let now = Utc::now();
        assert!(session(Some(now + Duration::minutes(4))).is_expired_at(now));
    }

    #[test]
    fn expiry_outside_margin_is_valid() {
        let now = Utc::now();
        assert!(!session(Some(now + Duration::minutes(6))).is_expired_at(now));
    }

    #[test]
    fn exact_margin_boundary_is_still_valid() {
        let now = Utc::now();
        assert!(!session(Some(now + Duration::seconds(EXPIRY_MARGIN_SECS))).is_expired_at(now));
    }

    #[test]
    fn missing_expiry_never_expires() {
        let far_future = Utc::now() + Duration::days(3650);
        assert!(!session(None).is_expired_at(far_future));
    }

    #[test]
    fn authorization_header_uses_token_type() {
        let mut s = session(None);
        s.token_type = "Convex".into();
        assert_eq!(s.authorization_header(), "Convex access");
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::AuthError;
use super::session::Session;
use crate::storage::{KeyValueStore, StorageKey};

const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Persists a [`Session`] as independent keys in a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// The access token alone decides whether a session exists.
    pub fn load(&self) -> Result<Option<Session>, AuthError> {
        let Some(access_token) = self.kv.get(StorageKey::AccessToken)? else {
            return Ok(None);
        };
        let token_type = self
            .kv
            .get(StorageKey::TokenType)?
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());
        let expires_at = match self.kv.get(StorageKey::TokenExpiry)? {
            Some(raw) => Some(parse_expiry(&raw)?),
            None => None,
        };
        let refresh_token = self.kv.get(StorageKey::RefreshToken)?;
        Ok(Some(Session {
            access_token,
            token_type,
            expires_at,
            refresh_token,
        }))
    }

    pub fn save(&self, session: &Session) -> Result<(), AuthError> {
        // Metadata first so a reader never sees a new token with stale expiry.
        self.kv.set(StorageKey::TokenType, &session.token_type)?;
        let expiry = session.expires_at.map(|at| at.to_rfc3339());
        self.kv
            .set_or_remove(StorageKey::TokenExpiry, expiry.as_deref())?;
        self.kv
            .set_or_remove(StorageKey::RefreshToken, session.refresh_token.as_deref())?;
        self.kv.set(StorageKey::AccessToken, &session.access_token)?;
        Ok(())
    }

    /// Removes the access token first; a partial failure leaves no usable
    /// session behind.
    pub fn clear(&self) -> Result<(), AuthError> {
        self.kv.remove(StorageKey::AccessToken)?;
        self.kv.remove(StorageKey::TokenExpiry)?;
        self.kv.remove(StorageKey::RefreshToken)?;
        self.kv.remove(StorageKey::TokenType)?;
        Ok(())
    }
}

fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, AuthError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    // Epoch milliseconds, as older launcher builds stored them.
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or_else(|| AuthError::Serialization(format!("invalid token expiry: {raw}")))
}

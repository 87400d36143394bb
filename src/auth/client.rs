//! OAuth 2.0 device authorization grant against the identity provider,
//! followed by the exchange for a vendor session.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::device_code::{AuthPhase, DeviceAuthorization, DeviceCodePoll, OidcToken, SlowDownPolicy};
use super::discovery::{self, OidcEndpoints};
use super::error::AuthError;
use super::session::Session;
use super::sleeper::{Sleeper, TokioSleeper};
use super::store::SessionStore;
use crate::config::DeckConfig;
use crate::navigation::ContextStore;
use crate::storage::KeyValueStore;

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Device-flow client that produces and maintains the vendor [`Session`].
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use convex_deck::auth::DeviceAuthClient;
/// use convex_deck::config::DeckConfig;
/// use convex_deck::storage::FileKeyValueStore;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), convex_deck::auth::AuthError> {
/// let config = DeckConfig::from_env();
/// let auth = DeviceAuthClient::from_config(&config, Arc::new(FileKeyValueStore::new_default()));
/// let session = auth
///     .login(|authz| println!("Enter {} at {}", authz.user_code, authz.browser_uri()), &CancellationToken::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceAuthClient {
    client: reqwest::Client,
    issuer: String,
    client_id: String,
    scopes: String,
    api_base_url: String,
    device_name: String,
    sessions: SessionStore,
    context: ContextStore,
    sleeper: Arc<dyn Sleeper>,
    slow_down: SlowDownPolicy,
    phase: Mutex<AuthPhase>,
}

impl DeviceAuthClient {
    pub fn from_config(config: &DeckConfig, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            issuer: config.issuer.clone(),
            client_id: config.client_id.clone(),
            scopes: config.scopes.clone(),
            api_base_url: config.api_base_url.clone(),
            device_name: config.device_name.clone(),
            sessions: SessionStore::new(kv.clone()),
            context: ContextStore::new(kv),
            sleeper: Arc::new(TokioSleeper),
            slow_down: SlowDownPolicy::default(),
            phase: Mutex::new(AuthPhase::Idle),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = scopes.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_slow_down_policy(mut self, policy: SlowDownPolicy) -> Self {
        self.slow_down = policy;
        self
    }

    /// Phase of the most recent authentication attempt.
    pub fn phase(&self) -> AuthPhase {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn transition(&self, next: AuthPhase) {
        let mut phase = self.phase.lock().unwrap_or_else(|p| p.into_inner());
        tracing::debug!(from = %*phase, to = %next, "device auth phase");
        *phase = next;
    }

    fn fail<T>(&self, phase: AuthPhase, error: AuthError) -> Result<T, AuthError> {
        tracing::warn!(error = %error, "device authorization failed");
        self.transition(phase);
        Err(error)
    }

    pub async fn discover(&self) -> Result<OidcEndpoints, AuthError> {
        self.transition(AuthPhase::DiscoveringEndpoints);
        match discovery::discover(&self.client, &self.issuer).await {
            Ok(endpoints) => Ok(endpoints),
            Err(err) => self.fail(AuthPhase::Failed, err),
        }
    }

    pub async fn request_authorization(
        &self,
        endpoints: &OidcEndpoints,
    ) -> Result<DeviceAuthorization, AuthError> {
        let authz = match self.send_authorization_request(endpoints).await {
            Ok(authz) => authz,
            Err(err) => return self.fail(AuthPhase::Failed, err),
        };
        tracing::info!(
            user_code = %authz.user_code,
            expires_in = authz.expires_in,
            interval = authz.interval,
            "device authorization requested"
        );
        self.transition(AuthPhase::AuthorizationRequested);
        Ok(authz)
    }

    async fn send_authorization_request(
        &self,
        endpoints: &OidcEndpoints,
    ) -> Result<DeviceAuthorization, AuthError> {
        let resp = self
            .client
            .post(&endpoints.device_authorization_endpoint)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", self.scopes.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::AuthorizationRequest {
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json().await?)
    }

    /// One request to the token endpoint.
    ///
    /// Error bodies are read from any status; RFC 8628 servers answer
    /// `authorization_pending` with 400.
    pub async fn poll_token_once(
        &self,
        endpoints: &OidcEndpoints,
        authz: &DeviceAuthorization,
    ) -> Result<DeviceCodePoll, AuthError> {
        let resp = self
            .client
            .post(&endpoints.token_endpoint)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", DEVICE_CODE_GRANT),
                ("client_id", self.client_id.as_str()),
                ("device_code", authz.device_code.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        let payload: TokenEndpointResponse = serde_json::from_str(&body).map_err(|_| {
            AuthError::Protocol(format!("token endpoint returned unreadable body (status {status})"))
        })?;

        if status.is_success() {
            if let Some(access_token) = payload.access_token {
                return Ok(DeviceCodePoll::Authorized {
                    token: OidcToken {
                        access_token,
                        token_type: payload.token_type,
                        expires_in: payload.expires_in,
                        refresh_token: payload.refresh_token,
                    },
                });
            }
        }
        match payload.error.as_deref() {
            Some("authorization_pending") => Ok(DeviceCodePoll::Pending),
            Some("slow_down") => Ok(DeviceCodePoll::SlowDown),
            Some("expired_token") => Ok(DeviceCodePoll::Expired),
            Some("access_denied") => Ok(DeviceCodePoll::Denied),
            Some(other) => Err(AuthError::Protocol(match payload.error_description {
                Some(description) => format!("{other}: {description}"),
                None => other.to_string(),
            })),
            None => Err(AuthError::Protocol(format!(
                "token endpoint returned neither token nor error (status {status})"
            ))),
        }
    }

    /// Poll until the user approves, the code dies, or `cancel` fires.
    ///
    /// The first request goes out immediately; later ones wait the poll
    /// interval. `cancel` is checked before every request and yields
    /// `Ok(None)`.
    pub async fn poll_for_token(
        &self,
        endpoints: &OidcEndpoints,
        authz: &DeviceAuthorization,
        cancel: &CancellationToken,
    ) -> Result<Option<OidcToken>, AuthError> {
        self.transition(AuthPhase::Polling);
        let deadline = Instant::now() + authz.lifetime();
        let mut interval = authz.poll_interval();
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!(attempts, "device authorization canceled");
                self.transition(AuthPhase::Idle);
                return Ok(None);
            }
            if Instant::now() >= deadline {
                return self.fail(
                    AuthPhase::Failed,
                    AuthError::Timeout {
                        waited_secs: authz.expires_in,
                    },
                );
            }

            attempts += 1;
            let poll = match self.poll_token_once(endpoints, authz).await {
                Ok(poll) => poll,
                Err(err) => return self.fail(AuthPhase::Failed, err),
            };
            match poll {
                DeviceCodePoll::Authorized { token } => {
                    tracing::debug!(attempts, "device authorization approved");
                    self.transition(AuthPhase::TokenObtained);
                    return Ok(Some(token));
                }
                DeviceCodePoll::Pending => {}
                DeviceCodePoll::SlowDown => {
                    interval = self.slow_down.next_interval(interval);
                    tracing::debug!(interval_secs = interval.as_secs(), "token endpoint asked to slow down");
                }
                DeviceCodePoll::Expired => return self.fail(AuthPhase::Expired, AuthError::Expired),
                DeviceCodePoll::Denied => return self.fail(AuthPhase::Denied, AuthError::Denied),
            }

            self.sleeper.sleep(interval).await;
        }
    }

    /// Trade the identity-provider token for a vendor session.
    pub async fn exchange(&self, token: &OidcToken) -> Result<Session, AuthError> {
        match self.send_exchange(token).await {
            Ok(session) => Ok(session),
            Err(err) => self.fail(AuthPhase::Failed, err),
        }
    }

    async fn send_exchange(&self, token: &OidcToken) -> Result<Session, AuthError> {
        let url = format!("{}/api/authorize", self.api_base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&ExchangeRequest {
                authn_token: &token.access_token,
                device_name: &self.device_name,
            })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                message,
            });
        }
        let payload: ExchangeResponse = resp.json().await?;
        let expires_at = match payload.expires_at {
            Some(secs) => Some(expiry_from_now(secs)?),
            None => None,
        };
        Ok(Session {
            access_token: payload.access_token,
            token_type: payload.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at,
            refresh_token: payload.refresh_token,
        })
    }

    /// Run the whole flow and persist the resulting session.
    ///
    /// `on_authorization` receives the user code and verification URI to
    /// show. Returns `Ok(None)` when `cancel` fires while polling.
    pub async fn login<F>(
        &self,
        on_authorization: F,
        cancel: &CancellationToken,
    ) -> Result<Option<Session>, AuthError>
    where
        F: FnOnce(&DeviceAuthorization),
    {
        let endpoints = self.discover().await?;
        let authz = self.request_authorization(&endpoints).await?;
        on_authorization(&authz);
        let Some(token) = self.poll_for_token(&endpoints, &authz, cancel).await? else {
            return Ok(None);
        };
        let session = self.exchange(&token).await?;
        self.sessions.save(&session)?;
        tracing::info!(expires_at = ?session.expires_at, "signed in");
        Ok(Some(session))
    }

    /// Stored session, unless it is missing or about to expire.
    pub fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.sessions.load()?.filter(|session| !session.is_expired()))
    }

    pub fn require_session(&self) -> Result<Session, AuthError> {
        self.current_session()?.ok_or(AuthError::NotLoggedIn)
    }

    /// Forget the session and the navigation state that depended on it.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.sessions.clear()?;
        self.context.clear()?;
        self.transition(AuthPhase::Idle);
        tracing::info!("signed out");
        Ok(())
    }
}

/// `expiresAt` is seconds from now; values past chrono's range are rejected.
fn expiry_from_now(secs: i64) -> Result<DateTime<Utc>, AuthError> {
    ChronoDuration::try_seconds(secs)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or_else(|| AuthError::Protocol(format!("session expiry out of range: {secs}s")))
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
    refresh_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequest<'a> {
    authn_token: &'a str,
    device_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeResponse {
    access_token: String,
    token_type: Option<String>,
    expires_at: Option<i64>,
    refresh_token: Option<String>,
}

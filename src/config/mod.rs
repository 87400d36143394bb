//! Configuration (layered: code > env > defaults).

use std::path::PathBuf;
use std::time::Duration;

use crate::storage::StoreConfig;

pub const DEFAULT_ISSUER: &str = "https://auth.convex.dev";
pub const DEFAULT_CLIENT_ID: &str = "convex-deck";
pub const DEFAULT_SCOPES: &str = "openid profile email offline_access";
pub const DEFAULT_API_BASE_URL: &str = "https://api.convex.dev";
pub const DEFAULT_DEVICE_NAME: &str = "Convex Deck";
pub const DEFAULT_DEPLOYMENT_URL: &str = "https://{name}.convex.cloud";
pub const DEFAULT_LOG_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Resolved settings for every client in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckConfig {
    pub issuer: String,
    pub client_id: String,
    pub scopes: String,
    pub api_base_url: String,
    pub device_name: String,
    /// Deployment URL with a `{name}` placeholder.
    pub deployment_url_template: String,
    pub data_dir: PathBuf,
    pub log_poll_interval: Duration,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            scopes: DEFAULT_SCOPES.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            deployment_url_template: DEFAULT_DEPLOYMENT_URL.to_string(),
            data_dir: StoreConfig::default_dir(),
            log_poll_interval: DEFAULT_LOG_POLL_INTERVAL,
        }
    }
}

impl DeckConfig {
    /// Load from environment variables (`CONVEX_DECK_*`), reading `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unset or blank values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let string_mappings: [(&str, &mut String); 6] = [
            ("CONVEX_DECK_ISSUER", &mut config.issuer),
            ("CONVEX_DECK_CLIENT_ID", &mut config.client_id),
            ("CONVEX_DECK_SCOPES", &mut config.scopes),
            ("CONVEX_DECK_API_URL", &mut config.api_base_url),
            ("CONVEX_DECK_DEVICE_NAME", &mut config.device_name),
            ("CONVEX_DECK_DEPLOYMENT_URL", &mut config.deployment_url_template),
        ];
        for (env_var, slot) in string_mappings {
            if let Some(value) = get(env_var) {
                *slot = value;
            }
        }

        if let Some(dir) = get("CONVEX_DECK_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("CONVEX_DECK_LOG_POLL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.log_poll_interval = Duration::from_millis(ms),
                _ => tracing::warn!(value = %raw, "ignoring invalid CONVEX_DECK_LOG_POLL_MS"),
            }
        }
        config
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.data_dir.clone())
    }

    /// Base URL of a named deployment.
    pub fn deployment_url(&self, deployment_name: &str) -> String {
        fill_deployment_url(&self.deployment_url_template, deployment_name)
    }
}

/// Substitute `{name}` in a deployment URL template.
pub fn fill_deployment_url(template: &str, deployment_name: &str) -> String {
    template
        .replace("{name}", deployment_name)
        .trim_end_matches('/')
        .to_string()
}

//! Wiring shared by the command handlers.

use std::sync::Arc;

use crate::api::{DashboardClient, DeploymentClient, DeploymentCredentials};
use crate::auth::{DeviceAuthClient, Session};
use crate::config::DeckConfig;
use crate::error::Result;
use crate::navigation::{ContextStore, Navigator};
use crate::storage::{FileKeyValueStore, KeyValueStore};

/// Configuration plus the durable store every command reads from.
pub struct App {
    pub config: DeckConfig,
    pub store: Arc<dyn KeyValueStore>,
}

impl App {
    pub fn from_env() -> Self {
        let config = DeckConfig::from_env();
        let store = Arc::new(FileKeyValueStore::new(config.store_config()));
        Self { config, store }
    }

    pub fn auth_client(&self) -> DeviceAuthClient {
        DeviceAuthClient::from_config(&self.config, self.store.clone())
    }

    pub fn session(&self) -> Result<Session> {
        Ok(self.auth_client().require_session()?)
    }

    pub fn navigator(&self) -> Result<Navigator> {
        Ok(Navigator::load(ContextStore::new(self.store.clone()))?)
    }

    pub fn dashboard(&self) -> Result<DashboardClient> {
        Ok(DashboardClient::new(&self.config, self.session()?))
    }

    /// Credentials for the selected deployment.
    pub async fn selected_deployment(&self) -> Result<DeploymentCredentials> {
        let navigator = self.navigator()?;
        let name = navigator.context().require_deployment()?;
        self.dashboard()?.deployment_credentials(name).await
    }

    pub async fn deployment_client(&self) -> Result<DeploymentClient> {
        Ok(DeploymentClient::new(self.selected_deployment().await?))
    }
}

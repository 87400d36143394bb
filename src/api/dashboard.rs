use serde::Deserialize;

use super::http::{auth_headers, read_json, shared_client};
use super::types::{Deployment, DeploymentCredentials, Project, Team};
use crate::auth::Session;
use crate::config::{fill_deployment_url, DeckConfig};
use crate::error::Result;

/// Vendor API calls made with the signed-in [`Session`].
pub struct DashboardClient {
    client: reqwest::Client,
    base_url: String,
    deployment_url_template: String,
    session: Session,
}

impl DashboardClient {
    pub fn new(config: &DeckConfig, session: Session) -> Self {
        Self {
            client: shared_client().clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            deployment_url_template: config.deployment_url_template.clone(),
            session,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_deployment_url_template(mut self, template: impl Into<String>) -> Self {
        self.deployment_url_template = template.into();
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "dashboard request");
        let resp = self
            .client
            .get(&url)
            .headers(auth_headers(&self.session.authorization_header()))
            .send()
            .await?;
        read_json(resp).await
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        self.get("/api/dashboard/teams").await
    }

    pub async fn list_projects(&self, team_id: &str) -> Result<Vec<Project>> {
        self.get(&format!("/api/dashboard/teams/{team_id}/projects"))
            .await
    }

    pub async fn list_deployments(&self, project_id: &str) -> Result<Vec<Deployment>> {
        self.get(&format!("/api/dashboard/projects/{project_id}/instances"))
            .await
    }

    /// Admin key for calling a deployment directly.
    pub async fn deployment_credentials(
        &self,
        deployment_name: &str,
    ) -> Result<DeploymentCredentials> {
        let url = format!(
            "{}/api/dashboard/instances/{deployment_name}/auth",
            self.base_url
        );
        let resp = self
            .client
            .post(&url)
            .headers(auth_headers(&self.session.authorization_header()))
            .send()
            .await?;
        let payload: AdminKeyResponse = read_json(resp).await?;
        Ok(DeploymentCredentials {
            deployment_name: deployment_name.to_string(),
            url: fill_deployment_url(&self.deployment_url_template, deployment_name),
            admin_key: payload.admin_key,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminKeyResponse {
    admin_key: String,
}

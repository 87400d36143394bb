use serde::Deserialize;
use serde_json::json;

use super::http::{auth_headers, error_message, read_json, shared_client};
use super::types::{DeploymentCredentials, DocumentPage, FunctionKind, FunctionOutcome};
use crate::error::{DeckError, Result};
use crate::logs::{LogBatch, LogEntry, LogError};

const PAGINATED_DOCUMENTS: &str = "_system/frontend/paginatedTableDocuments:default";

/// Calls made directly against one deployment with its admin key.
pub struct DeploymentClient {
    client: reqwest::Client,
    credentials: DeploymentCredentials,
}

impl DeploymentClient {
    pub fn new(credentials: DeploymentCredentials) -> Self {
        Self {
            client: shared_client().clone(),
            credentials,
        }
    }

    pub fn credentials(&self) -> &DeploymentCredentials {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.credentials.url)
    }

    fn authorization(&self) -> String {
        format!("Convex {}", self.credentials.admin_key)
    }

    /// Run a query, mutation or action with JSON arguments.
    ///
    /// A function that throws is a [`FunctionOutcome::Failure`], not an `Err`.
    pub async fn run_function(
        &self,
        kind: FunctionKind,
        path: &str,
        args: serde_json::Value,
    ) -> Result<FunctionOutcome> {
        tracing::debug!(%kind, path, deployment = %self.credentials.deployment_name, "running function");
        let resp = self
            .client
            .post(self.url(&format!("/api/{kind}")))
            .headers(auth_headers(&self.authorization()))
            .json(&json!({ "path": path, "args": args, "format": "json" }))
            .send()
            .await?;
        let payload: FunctionResponse = read_json(resp).await?;
        Ok(match payload.status.as_str() {
            "success" => FunctionOutcome::Success {
                value: payload.value.unwrap_or(serde_json::Value::Null),
                log_lines: payload.log_lines,
            },
            _ => FunctionOutcome::Failure {
                message: payload
                    .error_message
                    .unwrap_or_else(|| "function failed".to_string()),
                log_lines: payload.log_lines,
            },
        })
    }

    /// User table names, sorted.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(self.url("/api/shapes2"))
            .headers(auth_headers(&self.authorization()))
            .send()
            .await?;
        let shapes: serde_json::Map<String, serde_json::Value> = read_json(resp).await?;
        let mut tables: Vec<String> = shapes
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !name.starts_with('_'))
            .collect();
        tables.sort();
        Ok(tables)
    }

    pub async fn list_documents(
        &self,
        table: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<DocumentPage> {
        let args = json!({
            "table": table,
            "paginationOpts": { "cursor": cursor, "numItems": page_size },
        });
        match self
            .run_function(FunctionKind::Query, PAGINATED_DOCUMENTS, args)
            .await?
        {
            FunctionOutcome::Success { value, .. } => Ok(serde_json::from_value(value)?),
            FunctionOutcome::Failure { message, .. } => Err(DeckError::api(400, message)),
        }
    }

    /// Function executions newer than `cursor`.
    pub async fn fetch_logs(&self, cursor: Option<f64>) -> std::result::Result<LogBatch, LogError> {
        let mut request = self
            .client
            .get(self.url("/api/stream_function_logs"))
            .headers(auth_headers(&self.authorization()));
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor.to_string())]);
        }
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LogError::Fetch {
                status: Some(status.as_u16()),
                message: error_message(&body),
            });
        }
        let payload: LogStreamResponse = resp
            .json()
            .await
            .map_err(|err| LogError::Decode(err.to_string()))?;

        let mut entries = Vec::with_capacity(payload.entries.len());
        for raw in payload.entries {
            if !LogEntry::is_completion(&raw) {
                continue;
            }
            match LogEntry::from_raw(raw) {
                Ok(entry) => entries.push(entry),
                Err(err) => tracing::debug!(error = %err, "skipping unreadable log entry"),
            }
        }
        Ok(LogBatch {
            entries,
            cursor: payload.new_cursor.or(cursor),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunctionResponse {
    status: String,
    value: Option<serde_json::Value>,
    error_message: Option<String>,
    #[serde(default)]
    log_lines: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogStreamResponse {
    #[serde(default)]
    entries: Vec<serde_json::Value>,
    new_cursor: Option<f64>,
}

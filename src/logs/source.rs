use async_trait::async_trait;

use super::entry::LogEntry;
use super::error::LogError;
use super::filter::LogFilter;
use crate::api::{DeploymentClient, DeploymentCredentials};

/// Entries returned by one fetch plus the cursor for the next.
#[derive(Debug, Clone, Default)]
pub struct LogBatch {
    pub entries: Vec<LogEntry>,
    pub cursor: Option<f64>,
}

/// One fetch request.
///
/// `filter` lets a source narrow server-side when it can; the poller always
/// re-applies it client-side.
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub target: DeploymentCredentials,
    pub cursor: Option<f64>,
    pub filter: LogFilter,
}

/// Where the poller gets entries from.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch(&self, query: &LogQuery) -> Result<LogBatch, LogError>;
}

/// Reads the deployment's function-log stream over HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentLogSource;

#[async_trait]
impl LogSource for DeploymentLogSource {
    async fn fetch(&self, query: &LogQuery) -> Result<LogBatch, LogError> {
        // The stream endpoint has no server-side filter.
        DeploymentClient::new(query.target.clone())
            .fetch_logs(query.cursor)
            .await
    }
}

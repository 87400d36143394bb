//! Function-execution logs: parsing, buffering, filtering and live polling.

mod buffer;
mod entry;
mod error;
mod filter;
mod poller;
mod source;

pub use buffer::LogBuffer;
pub use entry::{FunctionType, LogEntry, LogStatus, UsageStats};
pub use error::LogError;
pub use filter::LogFilter;
pub use poller::{LogEvent, LogEventSink, LogPoller, PollerSettings};
pub use source::{DeploymentLogSource, LogBatch, LogQuery, LogSource};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Utc};

    use super::{LogEntry, LogStatus, UsageStats};

    pub fn entry(id: &str, secs: i64) -> LogEntry {
        LogEntry {
            id: id.to_string(),
            function_path: "messages:list".to_string(),
            function_type: None,
            status: LogStatus::Success,
            request_id: Some(format!("req-{id}")),
            timestamp: DateTime::<Utc>::from_timestamp(secs, 0).unwrap(),
            execution_time_ms: 1.0,
            cached: false,
            log_lines: Vec::new(),
            error_message: None,
            usage: UsageStats::default(),
            raw: serde_json::Value::Null,
        }
    }
}

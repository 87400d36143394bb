//! Function-execution log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::error::LogError;

/// Kind of function that produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FunctionType {
    Query,
    Mutation,
    Action,
    #[strum(to_string = "httpaction", serialize = "http")]
    HttpAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogStatus {
    Success,
    Failure,
}

/// Resource usage reported for an execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageStats {
    pub database_read_bytes: u64,
    pub database_write_bytes: u64,
    pub storage_read_bytes: u64,
    pub storage_write_bytes: u64,
    pub memory_used_mb: f64,
}

/// One completed function execution. Immutable once fetched; `id` is the
/// deduplication key across polls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub function_path: String,
    pub function_type: Option<FunctionType>,
    pub status: LogStatus,
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: f64,
    pub cached: bool,
    pub log_lines: Vec<String>,
    pub error_message: Option<String>,
    pub usage: UsageStats,
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    identifier: String,
    udf_type: Option<String>,
    #[serde(default)]
    log_lines: Vec<serde_json::Value>,
    /// Seconds since the epoch.
    timestamp: f64,
    #[serde(default)]
    cached_result: bool,
    /// Seconds.
    #[serde(default)]
    execution_time: f64,
    error: Option<String>,
    request_id: Option<String>,
    execution_id: Option<String>,
    #[serde(default)]
    usage_stats: Option<UsageStats>,
}

impl LogEntry {
    /// Only completion records describe a finished execution; progress
    /// records carry no outcome.
    pub fn is_completion(raw: &serde_json::Value) -> bool {
        match raw.get("kind").and_then(|k| k.as_str()) {
            Some(kind) => kind == "Completion",
            None => true,
        }
    }

    pub fn from_raw(raw: serde_json::Value) -> Result<Self, LogError> {
        let parsed: RawEntry = serde_json::from_value(raw.clone())
            .map_err(|err| LogError::Decode(err.to_string()))?;

        let millis = (parsed.timestamp * 1000.0).round() as i64;
        let timestamp = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| LogError::Decode(format!("timestamp out of range: {}", parsed.timestamp)))?;

        let id = match (&parsed.execution_id, &parsed.request_id) {
            (Some(execution_id), _) => execution_id.clone(),
            (None, Some(request_id)) => format!("{request_id}:{millis}"),
            (None, None) => {
                return Err(LogError::Decode(
                    "entry has neither executionId nor requestId".to_string(),
                ))
            }
        };

        let error_message = parsed.error.filter(|message| !message.is_empty());
        Ok(Self {
            id,
            function_type: parsed
                .udf_type
                .as_deref()
                .and_then(|udf| udf.parse().ok()),
            function_path: parsed.identifier,
            status: if error_message.is_some() {
                LogStatus::Failure
            } else {
                LogStatus::Success
            },
            request_id: parsed.request_id,
            timestamp,
            execution_time_ms: parsed.execution_time * 1000.0,
            cached: parsed.cached_result,
            log_lines: parsed.log_lines.iter().map(render_log_line).collect(),
            error_message,
            usage: parsed.usage_stats.unwrap_or_default(),
            raw,
        })
    }
}

/// Log lines are plain strings or `{level, messages}` objects.
fn render_log_line(line: &serde_json::Value) -> String {
    if let Some(text) = line.as_str() {
        return text.to_string();
    }
    let messages = line
        .get("messages")
        .and_then(|m| m.as_array())
        .map(|parts| {
            parts
                .iter()
                .map(|part| part.as_str().map(str::to_string).unwrap_or_else(|| part.to_string()))
                .collect::<Vec<_>>()
                .join(" ")
        });
    match (line.get("level").and_then(|l| l.as_str()), messages) {
        (Some(level), Some(text)) => format!("[{level}] {text}"),
        (None, Some(text)) => text,
        _ => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_success() -> serde_json::Value {
        json!({
            "kind": "Completion",
            "identifier": "messages:list",
            "udfType": "Query",
            "logLines": ["plain", {"level": "INFO", "messages": ["'hello'", 3]}],
            "timestamp": 1_700_000_000.25,
            "cachedResult": true,
            "executionTime": 0.012,
            "error": null,
            "requestId": "req-1",
            "executionId": "exec-1",
            "usageStats": {"databaseReadBytes": 120, "databaseWriteBytes": 0,
                           "storageReadBytes": 0, "storageWriteBytes": 0, "memoryUsedMb": 1.5}
        })
    }

    #[test]
    fn parses_successful_completion() {
        let entry = LogEntry::from_raw(raw_success()).unwrap();
        assert_eq!(entry.id, "exec-1");
        assert_eq!(entry.function_path, "messages:list");
        assert_eq!(entry.function_type, Some(FunctionType::Query));
        assert_eq!(entry.status, LogStatus::Success);
        assert_eq!(entry.timestamp.timestamp_millis(), 1_700_000_000_250);
        assert!((entry.execution_time_ms - 12.0).abs() < 1e-9);
        assert!(entry.cached);
        assert_eq!(entry.log_lines, vec!["plain", "[INFO] 'hello' 3"]);
        assert_eq!(entry.usage.database_read_bytes, 120);
        assert_eq!(entry.raw, raw_success());
    }

    #[test]
    fn error_marks_failure() {
        let mut raw = raw_success();
        raw["error"] = json!("Uncaught Error: boom");
        let entry = LogEntry::from_raw(raw).unwrap();
        assert_eq!(entry.status, LogStatus::Failure);
        assert_eq!(entry.error_message.as_deref(), Some("Uncaught Error: boom"));
    }

    #[test]
    fn id_falls_back_to_request_and_time() {
        let mut raw = raw_success();
        raw.as_object_mut().unwrap().remove("executionId");
        let entry = LogEntry::from_raw(raw).unwrap();
        assert_eq!(entry.id, "req-1:1700000000250");
    }

    #[test]
    fn entry_without_identity_is_rejected() {
        let mut raw = raw_success();
        let obj = raw.as_object_mut().unwrap();
        obj.remove("executionId");
        obj.remove("requestId");
        assert!(matches!(LogEntry::from_raw(raw), Err(LogError::Decode(_))));
    }

    #[test]
    fn http_actions_are_recognised() {
        let mut raw = raw_success();
        raw["udfType"] = json!("HttpAction");
        let entry = LogEntry::from_raw(raw).unwrap();
        assert_eq!(entry.function_type, Some(FunctionType::HttpAction));
    }

    #[test]
    fn progress_records_are_not_completions() {
        assert!(!LogEntry::is_completion(&json!({"kind": "Progress"})));
        assert!(LogEntry::is_completion(&raw_success()));
    }
}

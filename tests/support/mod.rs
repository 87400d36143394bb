#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use convex_deck::api::DeploymentCredentials;
use convex_deck::auth::Sleeper;
use convex_deck::logs::{
    LogBatch, LogEntry, LogError, LogQuery, LogSource, LogStatus, UsageStats,
};

/// Records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("sleeper lock poisoned").clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .expect("sleeper lock poisoned")
            .push(duration);
    }
}

struct Scripted {
    delay: Duration,
    result: Result<LogBatch, LogError>,
}

/// Plays back queued batches in order; an empty queue yields empty batches.
#[derive(Default)]
pub struct ScriptedLogSource {
    script: Mutex<VecDeque<Scripted>>,
    queries: Mutex<Vec<LogQuery>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedLogSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, entries: Vec<LogEntry>, cursor: Option<f64>) {
        self.push(Duration::ZERO, Ok(LogBatch { entries, cursor }));
    }

    pub fn push_err(&self, error: LogError) {
        self.push(Duration::ZERO, Err(error));
    }

    pub fn push_delayed(&self, delay: Duration, entries: Vec<LogEntry>) {
        self.push(
            delay,
            Ok(LogBatch {
                entries,
                cursor: None,
            }),
        );
    }

    fn push(&self, delay: Duration, result: Result<LogBatch, LogError>) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(Scripted { delay, result });
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().expect("queries lock poisoned").len()
    }

    pub fn queries(&self) -> Vec<LogQuery> {
        self.queries.lock().expect("queries lock poisoned").clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogSource for ScriptedLogSource {
    async fn fetch(&self, query: &LogQuery) -> Result<LogBatch, LogError> {
        self.queries
            .lock()
            .expect("queries lock poisoned")
            .push(query.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let next = self.script.lock().expect("script lock poisoned").pop_front();
        let result = match next {
            Some(scripted) => {
                if !scripted.delay.is_zero() {
                    tokio::time::sleep(scripted.delay).await;
                }
                scripted.result
            }
            None => Ok(LogBatch::default()),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub fn credentials(name: &str) -> DeploymentCredentials {
    DeploymentCredentials {
        deployment_name: name.to_string(),
        url: format!("https://{name}.convex.cloud"),
        admin_key: format!("admin-{name}"),
    }
}

pub fn log_entry(id: &str, secs: i64, function_path: &str, status: LogStatus) -> LogEntry {
    LogEntry {
        id: id.to_string(),
        function_path: function_path.to_string(),
        function_type: None,
        status,
        request_id: Some(format!("req-{id}")),
        timestamp: DateTime::<Utc>::from_timestamp(secs, 0).expect("valid timestamp"),
        execution_time_ms: 3.0,
        cached: false,
        log_lines: Vec::new(),
        error_message: None,
        usage: UsageStats::default(),
        raw: serde_json::Value::Null,
    }
}

pub fn ok_entry(id: &str, secs: i64) -> LogEntry {
    log_entry(id, secs, "messages:list", LogStatus::Success)
}

pub fn ids(entries: &[LogEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
}

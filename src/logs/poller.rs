//! Live log view for one deployment.
//!
//! A background task fetches on a fixed interval while streaming is on.
//! Fetches, scheduled or manual, never overlap: each one holds the fetch
//! lock until its result is merged.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bon::Builder;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::buffer::LogBuffer;
use super::entry::LogEntry;
use super::error::LogError;
use super::filter::LogFilter;
use super::source::{LogQuery, LogSource};
use crate::api::DeploymentCredentials;
use crate::config::DEFAULT_LOG_POLL_INTERVAL;
use crate::util::backoff::BackoffPolicy;

/// Notifications for the presentation layer.
#[derive(Debug, Clone)]
pub enum LogEvent {
    /// A fetch merged successfully.
    Updated { added: usize, total: usize },
    /// A fetch failed; the buffer is unchanged and polling continues.
    FetchFailed {
        error: LogError,
        consecutive_failures: u32,
    },
}

pub type LogEventSink = Arc<dyn Fn(LogEvent) + Send + Sync>;

#[derive(Debug, Clone, Builder)]
pub struct PollerSettings {
    /// Delay between successful fetches.
    #[builder(default = DEFAULT_LOG_POLL_INTERVAL)]
    pub interval: Duration,
    /// Delay schedule after failed fetches; never shorter than `interval`.
    #[builder(default)]
    pub backoff: BackoffPolicy,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Default)]
struct PollerState {
    target: Option<DeploymentCredentials>,
    filter: LogFilter,
    buffer: LogBuffer,
    cursor: Option<f64>,
    streaming: bool,
    // Bumped when the target changes so late results from the old one are dropped.
    generation: u64,
    consecutive_failures: u32,
}

struct Shared {
    source: Arc<dyn LogSource>,
    settings: PollerSettings,
    state: Mutex<PollerState>,
    fetch_lock: tokio::sync::Mutex<()>,
    wake: Notify,
    sink: Mutex<Option<LogEventSink>>,
}

/// Polls a deployment's function logs into a [`LogBuffer`].
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use convex_deck::api::DeploymentCredentials;
/// use convex_deck::logs::{DeploymentLogSource, LogFilter, LogPoller, PollerSettings};
///
/// # async fn example(credentials: DeploymentCredentials) {
/// let poller = LogPoller::new(Arc::new(DeploymentLogSource), PollerSettings::default());
/// poller.start(credentials, LogFilter::default());
/// let added = poller.refresh().await;
/// # }
/// ```
pub struct LogPoller {
    shared: Arc<Shared>,
    task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl LogPoller {
    pub fn new(source: Arc<dyn LogSource>, settings: PollerSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                settings,
                state: Mutex::new(PollerState::default()),
                fetch_lock: tokio::sync::Mutex::new(()),
                wake: Notify::new(),
                sink: Mutex::new(None),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn with_event_sink(self, sink: LogEventSink) -> Self {
        *lock(&self.shared.sink) = Some(sink);
        self
    }

    /// Begin streaming `target`. The first fetch happens immediately.
    ///
    /// Switching to a different deployment drops the buffer and cursor;
    /// restarting the same one keeps them. Must be called within a tokio
    /// runtime.
    pub fn start(&self, target: DeploymentCredentials, filter: LogFilter) {
        self.stop();
        {
            let mut state = self.shared.state();
            if state.target.as_ref() != Some(&target) {
                state.buffer.clear();
                state.cursor = None;
                state.generation += 1;
            }
            tracing::info!(deployment = %target.deployment_name, "log streaming started");
            state.target = Some(target);
            state.filter = filter;
            state.streaming = true;
            state.consecutive_failures = 0;
        }
        self.spawn();
    }

    fn spawn(&self) {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(self.shared.clone(), cancel.clone()));
        *lock(&self.task) = Some((cancel, handle));
    }

    /// Stop scheduling ticks. A fetch already in flight still completes.
    pub fn stop(&self) {
        if let Some((cancel, _handle)) = lock(&self.task).take() {
            cancel.cancel();
        }
        self.shared.state().streaming = false;
    }

    /// Flip streaming on or off and return the new state. Entries already
    /// fetched stay visible while suspended.
    ///
    /// Turning streaming back on after [`LogPoller::stop`] resumes polling
    /// the last target; without a target streaming stays off. Must be called
    /// within a tokio runtime.
    pub fn toggle_streaming(&self) -> bool {
        let (streaming, has_target) = {
            let mut state = self.shared.state();
            let has_target = state.target.is_some();
            state.streaming = !state.streaming && has_target;
            (state.streaming, has_target)
        };
        tracing::debug!(streaming, has_target, "log streaming toggled");
        if streaming && !self.is_running() {
            self.spawn();
        } else {
            self.shared.wake.notify_one();
        }
        streaming
    }

    /// Whether the background task is alive.
    pub fn is_running(&self) -> bool {
        lock(&self.task)
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }

    pub fn is_streaming(&self) -> bool {
        self.shared.state().streaming
    }

    /// One immediate fetch regardless of the streaming flag.
    ///
    /// Returns the number of new entries once the merge is done.
    pub async fn refresh(&self) -> Result<usize, LogError> {
        self.shared.fetch_once().await
    }

    /// Empty the buffer. Streaming and the server cursor are untouched.
    pub fn clear_logs(&self) {
        self.shared.state().buffer.clear();
    }

    /// Change the client-side filter; nothing is refetched.
    pub fn set_filter(&self, filter: LogFilter) {
        self.shared.state().filter = filter;
    }

    pub fn filter(&self) -> LogFilter {
        self.shared.state().filter.clone()
    }

    /// Every buffered entry, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.shared.state().buffer.entries().to_vec()
    }

    /// Buffered entries that pass the current filter, newest first.
    pub fn visible_entries(&self) -> Vec<LogEntry> {
        let state = self.shared.state();
        state.buffer.filtered(&state.filter).cloned().collect()
    }
}

impl Drop for LogPoller {
    fn drop(&mut self) {
        if let Some((cancel, _handle)) = lock(&self.task).take() {
            cancel.cancel();
        }
    }
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, PollerState> {
        lock(&self.state)
    }

    fn emit(&self, event: LogEvent) {
        let sink = lock(&self.sink).clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }

    async fn fetch_once(&self) -> Result<usize, LogError> {
        let _in_flight = self.fetch_lock.lock().await;
        let (query, generation) = {
            let state = self.state();
            let target = state.target.clone().ok_or(LogError::NotStarted)?;
            let query = LogQuery {
                target,
                cursor: state.cursor,
                filter: state.filter.clone(),
            };
            (query, state.generation)
        };

        let result = self.source.fetch(&query).await;

        let outcome = {
            let mut state = self.state();
            if state.generation != generation {
                tracing::debug!("discarding log batch for a previous deployment");
                return Ok(0);
            }
            match result {
                Ok(batch) => {
                    state.consecutive_failures = 0;
                    let added = state.buffer.merge(batch.entries);
                    let newest = state
                        .buffer
                        .newest()
                        .map(|entry| entry.timestamp.timestamp_millis() as f64);
                    state.cursor = batch.cursor.or(newest).or(state.cursor);
                    tracing::debug!(added, total = state.buffer.len(), "log batch merged");
                    Ok((added, state.buffer.len()))
                }
                Err(error) => {
                    state.consecutive_failures += 1;
                    tracing::warn!(
                        error = %error,
                        consecutive_failures = state.consecutive_failures,
                        "log fetch failed"
                    );
                    Err((error, state.consecutive_failures))
                }
            }
        };

        match outcome {
            Ok((added, total)) => {
                self.emit(LogEvent::Updated { added, total });
                Ok(added)
            }
            Err((error, consecutive_failures)) => {
                self.emit(LogEvent::FetchFailed {
                    error: error.clone(),
                    consecutive_failures,
                });
                Err(error)
            }
        }
    }

    fn next_delay(&self) -> Duration {
        let failures = self.state().consecutive_failures;
        let interval = self.settings.interval;
        interval.max(self.settings.backoff.delay_for(failures))
    }
}

async fn run(shared: Arc<Shared>, cancel: CancellationToken) {
    loop {
        if cancel.is_cancelled() {
            return;
        }
        if !shared.state().streaming {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = shared.wake.notified() => continue,
            }
        }

        // Errors are already reported through the sink.
        let _ = shared.fetch_once().await;
        if cancel.is_cancelled() {
            return;
        }

        let delay = shared.next_delay();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
            _ = shared.wake.notified() => {}
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

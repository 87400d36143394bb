//! `convex-deck logs`: tail function executions until Ctrl-C.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::app::App;
use super::LogsArgs;
use crate::error::Result;
use crate::logs::{
    DeploymentLogSource, LogEntry, LogEvent, LogFilter, LogPoller, LogStatus, PollerSettings,
};

pub async fn handle_logs(app: &App, args: LogsArgs) -> Result<()> {
    let credentials = app.selected_deployment().await?;
    let filter = LogFilter {
        function: args.function,
        function_type: args.function_type,
        status: args.status,
        request_id: args.request,
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let settings = PollerSettings::builder()
        .interval(app.config.log_poll_interval)
        .build();
    let poller = LogPoller::new(Arc::new(DeploymentLogSource), settings).with_event_sink(
        Arc::new(move |event: LogEvent| {
            let _ = tx.send(event);
        }),
    );

    eprintln!("📡 Tailing {} (Ctrl-C to stop)", credentials.deployment_name);
    poller.start(credentials, filter);

    let mut printed = HashSet::new();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Some(LogEvent::Updated { added, .. }) if added > 0 => {
                    print_unseen(&poller.visible_entries(), &mut printed);
                }
                Some(LogEvent::Updated { .. }) => {}
                Some(LogEvent::FetchFailed { error, consecutive_failures }) => {
                    eprintln!("⚠️  {error} (attempt {consecutive_failures}, retrying)");
                }
                None => break,
            }
        }
    }
    poller.stop();
    Ok(())
}

/// Print entries not printed before, oldest first.
fn print_unseen(entries: &[LogEntry], printed: &mut HashSet<String>) {
    for entry in entries.iter().rev() {
        if printed.insert(entry.id.clone()) {
            println!("{}", format_entry(entry));
            for line in &entry.log_lines {
                println!("    {line}");
            }
        }
    }
}

fn format_entry(entry: &LogEntry) -> String {
    let marker = match entry.status {
        LogStatus::Success => "✓",
        LogStatus::Failure => "✗",
    };
    let kind = entry
        .function_type
        .map(|t| t.to_string())
        .unwrap_or_default();
    let cached = if entry.cached { " (cached)" } else { "" };
    let mut line = format!(
        "{} {marker} {kind:<10} {} {:.0}ms{cached}",
        entry.timestamp.format("%H:%M:%S%.3f"),
        entry.function_path,
        entry.execution_time_ms,
    );
    if let Some(message) = &entry.error_message {
        line.push_str(&format!("  {message}"));
    }
    line
}

use thiserror::Error;

/// Log fetch failures. None of them touch the buffer or stop streaming.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LogError {
    #[error("Log polling has not been started")]
    NotStarted,
    #[error("Fetching logs failed{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Fetch { status: Option<u16>, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unreadable log payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LogError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

//! Error types for convex-deck.

use thiserror::Error;

use crate::auth::AuthError;
use crate::logs::LogError;
use crate::storage::StorageError;

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Network,
    Server,
    Api,
    Configuration,
    Storage,
    Serialization,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    SignInAgain,
    RetryLater,
    CheckConfiguration,
    SelectContext,
    ReportBug,
}

/// Primary error type for all convex-deck operations.
#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthError),

    #[error("Log error: {0}")]
    Logs(#[from] LogError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Nothing selected: {0}")]
    MissingSelection(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DeckError {
    /// Create an API error from a status code and body text.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Network(_) => ErrorCategory::Network,
            Self::Io(_) | Self::Storage(_) => ErrorCategory::Storage,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Configuration(_) | Self::MissingSelection(_) | Self::InvalidArgument(_) => {
                ErrorCategory::Configuration
            }
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::Logs(err) => match err {
                LogError::Network(_) => ErrorCategory::Network,
                LogError::Fetch {
                    status: Some(401 | 403),
                    ..
                } => ErrorCategory::Authentication,
                LogError::Fetch {
                    status: Some(500..=599),
                    ..
                } => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        if let Self::MissingSelection(_) = self {
            return RecoverySuggestion::SelectContext;
        }
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::SignInAgain,
            ErrorCategory::Network | ErrorCategory::Server => RecoverySuggestion::RetryLater,
            ErrorCategory::Configuration | ErrorCategory::Storage => {
                RecoverySuggestion::CheckConfiguration
            }
            _ => RecoverySuggestion::ReportBug,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_api_errors_ask_for_sign_in() {
        let err = DeckError::api(401, "token revoked");
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert_eq!(err.recovery_suggestion(), RecoverySuggestion::SignInAgain);
        assert!(!err.is_retryable());
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = DeckError::api(503, "unavailable");
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_selection_points_at_context() {
        let err = DeckError::MissingSelection("deployment");
        assert_eq!(err.recovery_suggestion(), RecoverySuggestion::SelectContext);
        assert!(err.to_string().contains("deployment"));
    }

    #[test]
    fn auth_errors_convert_into_authentication() {
        let err: DeckError = AuthError::Denied.into();
        assert_eq!(err.category(), ErrorCategory::Authentication);
    }

    #[test]
    fn log_fetch_server_errors_are_retryable() {
        let err: DeckError = LogError::Fetch {
            status: Some(502),
            message: "bad gateway".into(),
        }
        .into();
        assert!(err.is_retryable());
    }
}

//! CLI-specific error formatting for user-facing messages.

use crate::auth::AuthError;
use crate::error::{DeckError, RecoverySuggestion};

/// Map a [`DeckError`] to a user-facing help string with actionable guidance.
pub fn format_error_help(err: &DeckError) -> String {
    match err {
        DeckError::Authentication(AuthError::NotLoggedIn) => {
            "Not signed in. Run: convex-deck auth login".to_string()
        }
        DeckError::MissingSelection(level) => {
            format!("No {level} selected. Run: convex-deck context {level} <id>")
        }
        other => match other.recovery_suggestion() {
            RecoverySuggestion::SignInAgain => {
                format!("{other}. Run: convex-deck auth login")
            }
            RecoverySuggestion::RetryLater => format!("{other}. Try again in a moment."),
            RecoverySuggestion::CheckConfiguration => {
                format!("{other}. Check your .env and CONVEX_DECK_* variables.")
            }
            RecoverySuggestion::SelectContext | RecoverySuggestion::ReportBug => {
                format!("{other}")
            }
        },
    }
}

use bon::Builder;

use super::entry::{FunctionType, LogEntry, LogStatus};

/// Client-side narrowing of the fetched buffer.
///
/// Text fields match case-insensitive substrings; unset fields match
/// everything.
///
/// ```
/// use convex_deck::logs::{LogFilter, LogStatus};
///
/// let filter = LogFilter::builder()
///     .function("messages:")
///     .status(LogStatus::Failure)
///     .build();
/// assert!(!filter.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct LogFilter {
    #[builder(into)]
    pub function: Option<String>,
    pub function_type: Option<FunctionType>,
    pub status: Option<LogStatus>,
    #[builder(into)]
    pub request_id: Option<String>,
}

impl LogFilter {
    pub fn is_empty(&self) -> bool {
        self.function.is_none()
            && self.function_type.is_none()
            && self.status.is_none()
            && self.request_id.is_none()
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(needle) = &self.function {
            if !contains_ignore_case(&entry.function_path, needle) {
                return false;
            }
        }
        if let Some(function_type) = self.function_type {
            if entry.function_type != Some(function_type) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        if let Some(needle) = &self.request_id {
            match &entry.request_id {
                Some(request_id) if contains_ignore_case(request_id, needle) => {}
                _ => return false,
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::test_support::entry;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(LogFilter::default().matches(&entry("a", 1)));
        assert!(LogFilter::default().is_empty());
    }

    #[test]
    fn function_match_is_case_insensitive_substring() {
        let filter = LogFilter::builder().function("MESSAGES").build();
        let mut e = entry("a", 1);
        e.function_path = "messages:send".into();
        assert!(filter.matches(&e));
        e.function_path = "users:get".into();
        assert!(!filter.matches(&e));
    }

    #[test]
    fn status_and_type_must_both_match() {
        let filter = LogFilter::builder()
            .status(LogStatus::Failure)
            .function_type(FunctionType::Mutation)
            .build();
        let mut e = entry("a", 1);
        e.status = LogStatus::Failure;
        e.function_type = Some(FunctionType::Query);
        assert!(!filter.matches(&e));
        e.function_type = Some(FunctionType::Mutation);
        assert!(filter.matches(&e));
    }

    #[test]
    fn request_filter_skips_entries_without_request_id() {
        let filter = LogFilter::builder().request_id("abc").build();
        let mut e = entry("a", 1);
        e.request_id = None;
        assert!(!filter.matches(&e));
        e.request_id = Some("xxABCxx".into());
        assert!(filter.matches(&e));
    }
}

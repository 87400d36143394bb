use std::collections::HashSet;

use super::entry::LogEntry;
use super::filter::LogFilter;

/// Ordered, de-duplicated set of fetched entries, newest first.
///
/// Grows until [`LogBuffer::clear`]; there is no size cap.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    entries: Vec<LogEntry>,
    ids: HashSet<String>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unseen entries and restore newest-first order.
    ///
    /// Returns how many entries were new.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = LogEntry>) -> usize {
        let before = self.entries.len();
        for entry in incoming {
            if self.ids.insert(entry.id.clone()) {
                self.entries.push(entry);
            }
        }
        let added = self.entries.len() - before;
        if added > 0 {
            self.entries.sort_by(|a, b| {
                b.timestamp
                    .cmp(&a.timestamp)
                    .then_with(|| a.id.cmp(&b.id))
            });
        }
        added
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn filtered<'a>(&'a self, filter: &'a LogFilter) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.entries.iter().filter(move |entry| filter.matches(entry))
    }

    pub fn newest(&self) -> Option<&LogEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

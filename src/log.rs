//! In-memory run log.
//!
//! A bounded, newest-first journal of what the engine did. It lives only as
//! long as the engine that owns it; nothing here touches the file system.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of entries kept before the oldest are dropped.
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// One timestamped log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    /// Create an entry stamped with the current local time.
    #[must_use]
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
        }
    }

    /// Render as `HH:MM:SS - message`.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{} - {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Bounded newest-first log.
///
/// # Example
///
/// ```
/// use loopcheck::log::RunLog;
///
/// let mut log = RunLog::with_capacity(2);
/// log.push("first");
/// log.push("second");
/// log.push("third");
///
/// let messages: Vec<_> = log.iter().map(|e| e.message.as_str()).collect();
/// assert_eq!(messages, vec!["third", "second"]);
/// ```
#[derive(Debug, Clone)]
pub struct RunLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl RunLog {
    /// Create a log holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a message, evicting the oldest entry when full.
    pub fn push(&mut self, message: impl Into<String>) {
        self.push_entry(LogEntry::now(message));
    }

    /// Record a pre-built entry.
    pub fn push_entry(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Owned copy of the entries, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Rendered lines, newest first.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        self.entries.iter().map(LogEntry::render).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

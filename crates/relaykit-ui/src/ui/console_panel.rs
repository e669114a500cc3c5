//! Console panel model
//!
//! Headless log backing the device console: append-only, direction-tagged,
//! capped. The GTK view renders the strings produced here; keeping the
//! model separate makes ordering and prefix behavior unit-testable.

use std::collections::VecDeque;

/// Direction marker for a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDirection {
    /// Command written to the board
    Outbound,
    /// Line received from the board
    Inbound,
    /// Local status note (connect/disconnect)
    Info,
}

impl LogDirection {
    /// Prefix shown in front of the entry text
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Outbound => "-> ",
            Self::Inbound => "<- ",
            Self::Info => "",
        }
    }
}

/// One console log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Direction marker
    pub direction: LogDirection,
    /// Entry text without prefix
    pub text: String,
}

impl LogEntry {
    /// Display form, prefix included
    pub fn formatted(&self) -> String {
        format!("{}{}", self.direction.prefix(), self.text)
    }
}

/// Append-only console log
///
/// Entries are kept in arrival order and trimmed from the front once
/// `max_entries` is exceeded.
#[derive(Debug)]
pub struct ConsolePanel {
    entries: VecDeque<LogEntry>,
    /// Maximum number of entries to keep
    pub max_entries: usize,
}

impl ConsolePanel {
    /// Create an empty panel
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: 5000,
        }
    }

    /// Append an outbound command echo; returns the display form
    pub fn add_outbound(&mut self, text: impl Into<String>) -> String {
        self.push(LogDirection::Outbound, text.into())
    }

    /// Append an inbound line; returns the display form
    pub fn add_inbound(&mut self, text: impl Into<String>) -> String {
        self.push(LogDirection::Inbound, text.into())
    }

    /// Append a local status note; returns the display form
    pub fn add_info(&mut self, text: impl Into<String>) -> String {
        self.push(LogDirection::Info, text.into())
    }

    fn push(&mut self, direction: LogDirection, text: String) -> String {
        let entry = LogEntry { direction, text };
        let formatted = entry.formatted();
        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
        formatted
    }

    /// Number of entries currently held
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Display strings for every held entry, oldest first
    pub fn displayed_strings(&self) -> Vec<String> {
        self.entries.iter().map(LogEntry::formatted).collect()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ConsolePanel {
    fn default() -> Self {
        Self::new()
    }
}

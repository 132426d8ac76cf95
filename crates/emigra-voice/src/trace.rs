//! Bounded diagnostic trace for session troubleshooting.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Default number of entries retained by the trace.
pub const DEFAULT_TRACE_CAPACITY: usize = 20;

/// A single timestamped trace entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub at: DateTime<Utc>,
    pub line: String,
}

/// Fixed-capacity trace of orchestrator activity.
///
/// Nothing reads the trace for correctness; it exists so a support engineer
/// can see what a session did. The oldest entry is dropped silently once
/// capacity is exceeded.
#[derive(Debug)]
pub struct DiagnosticTrace {
    entries: VecDeque<TraceEntry>,
    capacity: usize,
}

impl DiagnosticTrace {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a timestamped entry, evicting the oldest past capacity.
    pub fn append(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(trace = %line, "voice trace");
        self.entries.push_back(TraceEntry {
            at: Utc::now(),
            line,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Entries in arrival order, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Formats the retained entries for display, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("{} {}", e.at.format("%H:%M:%S%.3f"), e.line))
            .collect()
    }
}

impl Default for DiagnosticTrace {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_CAPACITY)
    }
}

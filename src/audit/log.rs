use crate::state::State;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

/// A single accepted state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub timestamp: DateTime<Utc>,
    pub from: State,
    pub to: State,
}

impl TransitionRecord {
    /// Create a record stamped with the current time
    pub fn new(from: State, to: State) -> Self {
        Self {
            timestamp: Utc::now(),
            from,
            to,
        }
    }
}

impl fmt::Display for TransitionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}->{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.from,
            self.to
        )
    }
}

/// In-memory, insertion-ordered history of transitions.
///
/// Not synchronized on its own; the controller keeps it under the same lock as the
/// current state.
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Vec<TransitionRecord>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: TransitionRecord) {
        self.records.push(record);
    }

    /// Point-in-time copy of every record, oldest first
    pub fn snapshot(&self) -> Vec<TransitionRecord> {
        self.records.clone()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One line per record, newline-joined; empty string when there are none
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(|record| record.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

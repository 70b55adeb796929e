use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::debug;

use crate::domain::types::LogEntry;

/// Append-only, order-preserving log of human-readable status lines.
///
/// The transcript is the one resource appended to by the executor, the
/// dispatcher, and the session controller; the lock keeps entries whole and
/// ordered by call order. Clones share the same underlying sequence.
#[derive(Clone, Default)]
pub struct Transcript {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, text: impl Into<String>) {
        let text = text.into();
        debug!(line = %text, "transcript");
        let mut entries = self.entries.lock().expect("transcript lock");
        let seq = entries.len() as u64;
        entries.push(LogEntry {
            seq,
            at: Utc::now(),
            text,
        });
    }

    /// Read-only copy of the entries in append order.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().expect("transcript lock").clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("transcript lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

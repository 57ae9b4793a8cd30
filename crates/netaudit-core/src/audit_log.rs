// ── Bounded audit log ──
//
// Append-only FIFO of `LogEntry` records with a hard capacity. Once full,
// each append evicts the oldest entry. Insertion order is the only order.

use std::collections::VecDeque;

use serde::Serialize;

use crate::model::LogEntry;

/// Default maximum number of retained entries.
pub const LOG_CAPACITY: usize = 100;

/// A bounded, ordered, append-only record of audit events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    /// Entries ever appended, including evicted ones.
    appended: u64,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    /// An empty log holding at most [`LOG_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    /// An empty log holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            appended: 0,
        }
    }

    /// Add `entry` at the tail, evicting from the head past capacity.
    pub fn append(&mut self, entry: LogEntry) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.appended += 1;
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// The most recently appended entry.
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of entries ever appended. Lets a reader that saw
    /// `seen` entries find the ones it has not seen yet.
    pub fn total_appended(&self) -> u64 {
        self.appended
    }

    /// Retained entries appended after the first `seen`, oldest first.
    /// Entries already evicted are skipped.
    pub fn since(&self, seen: u64) -> impl Iterator<Item = &LogEntry> {
        let unseen = self.appended.saturating_sub(seen);
        let skip = usize::try_from(unseen).map_or(0, |n| self.entries.len().saturating_sub(n));
        self.entries.iter().skip(skip)
    }

    /// Owned copy of the retained entries, oldest first.
    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

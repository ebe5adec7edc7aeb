//! Bounded per-target message history.
//!
//! Each target (channel or nickname) keeps an ordered log of exchanged
//! messages, trimmed oldest-first after every append. Entries survive
//! connect/disconnect cycles for the lifetime of the client object.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

/// Default cap on entries kept per target.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// One exchanged message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// When the message was sent or received.
    pub timestamp: DateTime<Utc>,
    /// Nickname the message came from.
    pub from: String,
    /// Message text.
    pub text: String,
}

/// Mapping from target name to its bounded, ordered message log.
#[derive(Debug)]
pub struct HistoryStore {
    targets: HashMap<String, VecDeque<HistoryEntry>>,
    limit: usize,
}

impl HistoryStore {
    /// Create a store keeping at most `limit` entries per target.
    pub fn new(limit: usize) -> Self {
        Self {
            targets: HashMap::new(),
            limit,
        }
    }

    /// Append an entry to a target's log, evicting from the front if the cap
    /// is exceeded. Trimming runs after every append; a log never grows
    /// unbounded.
    pub fn append(&mut self, target: &str, entry: HistoryEntry) {
        let log = self.targets.entry(target.to_owned()).or_default();
        log.push_back(entry);
        while log.len() > self.limit {
            log.pop_front();
        }
    }

    /// Record a message stamped with the current time.
    pub fn record(&mut self, target: &str, from: impl Into<String>, text: impl Into<String>) {
        self.append(
            target,
            HistoryEntry {
                timestamp: Utc::now(),
                from: from.into(),
                text: text.into(),
            },
        );
    }

    /// The most recent `count` entries for a target, in chronological order.
    /// Unknown targets yield an empty result; this never fails.
    pub fn query(&self, target: &str, count: usize) -> Vec<HistoryEntry> {
        match self.targets.get(target) {
            Some(log) => {
                let skip = log.len().saturating_sub(count);
                log.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

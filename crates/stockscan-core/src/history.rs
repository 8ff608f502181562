//! # Undo History
//!
//! Bounded LIFO of undoable actions. Every mode switch and every
//! ledger-writing scan pushes one entry; when the stack is full the oldest
//! entry is dropped without notice.
//!
//! Undoing a scan only removes the newest ledger row. The stock projection
//! is left as it is and converges on the next rebuild.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::mode::ModeKind;
use crate::types::EventKind;
use crate::DEFAULT_HISTORY_CAPACITY;

/// One undoable action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEntry {
    /// A scan that appended one ledger row.
    ScanUndo { sku: String, kind: EventKind },
    /// A mode switch; holds the mode that was active before it.
    ModeUndo { previous: ModeKind },
}

/// Bounded undo stack.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    /// Creates an empty history. A zero capacity is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        History {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&HistoryEntry> {
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

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        History::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(sku: &str) -> HistoryEntry {
        HistoryEntry::ScanUndo {
            sku: sku.to_string(),
            kind: EventKind::Input,
        }
    }

    #[test]
    fn test_lifo_order() {
        let mut history = History::default();
        history.push(scan("a"));
        history.push(HistoryEntry::ModeUndo {
            previous: ModeKind::Input,
        });

        assert_eq!(
            history.pop(),
            Some(HistoryEntry::ModeUndo {
                previous: ModeKind::Input
            })
        );
        assert_eq!(history.pop(), Some(scan("a")));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn test_oldest_entries_are_evicted() {
        let mut history = History::default();
        for i in 0..(DEFAULT_HISTORY_CAPACITY + 5) {
            history.push(scan(&i.to_string()));
        }

        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(
            history.peek(),
            Some(&scan(&(DEFAULT_HISTORY_CAPACITY + 4).to_string()))
        );

        let mut oldest = None;
        while let Some(entry) = history.pop() {
            oldest = Some(entry);
        }
        assert_eq!(oldest, Some(scan("5")));
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let mut history = History::with_capacity(0);
        history.push(scan("a"));
        history.push(scan("b"));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.pop(), Some(scan("b")));
        assert!(history.is_empty());
    }

    #[test]
    fn test_entry_serializes_tagged() {
        let json = serde_json::to_string(&scan("123")).unwrap();
        assert_eq!(json, r#"{"type":"scan_undo","sku":"123","kind":"input"}"#);
    }
}

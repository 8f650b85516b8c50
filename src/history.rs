//! Snapshot-based undo/redo
//!
//! The stack holds deep copies of the current frame's layer list. `index`
//! always points at the entry representing the live state; entries after it
//! are redo candidates. Pushing discards redo candidates, and once the stack
//! exceeds its depth the oldest entry is evicted.
//!
//! Navigation hands out shared references; callers clone out of the stack,
//! so entries are never mutated by a restore.

use crate::document::Layer;

/// Depth used when no configuration overrides it.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// One recorded state of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Frame the layers belong to
    pub frame: usize,
    /// Active layer at capture time
    pub active_layer: usize,
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    max_history: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Create an empty history holding at most `max_history` entries (min 1).
    pub fn new(max_history: usize) -> Self {
        Self { entries: Vec::new(), index: 0, max_history: max_history.max(1) }
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: HistoryEntry) {
        self.entries.clear();
        self.entries.push(initial);
        self.index = 0;
    }

    /// Record a new state after the current one.
    pub fn snapshot(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(entry);
        self.index = self.entries.len() - 1;

        if self.entries.len() > self.max_history {
            let excess = self.entries.len() - self.max_history;
            self.entries.drain(..excess);
            self.index -= excess;
        }
    }

    /// Step back one entry; `None` when already at the oldest.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward one entry; `None` when already at the newest.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    /// The entry representing the live state.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the live entry.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Change the depth, evicting the oldest entries if the stack is now too long.
    pub fn set_max_history(&mut self, max_history: usize) {
        self.max_history = max_history.max(1);
        if self.entries.len() > self.max_history {
            let excess = self.entries.len() - self.max_history;
            self.entries.drain(..excess);
            self.index = self.index.saturating_sub(excess);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }
}

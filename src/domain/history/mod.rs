//! Undo/redo history of trim range snapshots.
//!
//! The stack holds snapshots taken *before* each user mutation. The cursor
//! points at the entry that undo would move away from; entries past the
//! cursor are redo targets and are discarded by the next push.

use crate::domain::model::HistoryEntry;

/// Default bound on the number of snapshots kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Cursor-based undo/redo stack.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    max_entries: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryStack {
    /// Create an empty stack bounded to `max_entries` snapshots (at least 2).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_entries: max_entries.max(2),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Record a snapshot ahead of a mutation.
    ///
    /// Truncates everything after the cursor, then appends. A snapshot equal
    /// to the entry under the cursor is not duplicated.
    pub fn push(&mut self, snapshot: HistoryEntry) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
            if self.entries[self.cursor] == snapshot {
                return;
            }
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn can_undo(&self, current: &HistoryEntry) -> bool {
        match self.entries.len() {
            0 => false,
            _ if self.cursor > 0 => true,
            _ => self.entries[0] != *current,
        }
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor + 1 < self.entries.len()
    }

    /// Step back one snapshot.
    ///
    /// When the cursor sits on the newest entry and `current` differs from it,
    /// `current` is appended first so that redo can return to it.
    pub fn undo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let at_tip = self.cursor + 1 == self.entries.len();
        if at_tip && self.entries[self.cursor] != current {
            self.entries.push(current);
            if self.entries.len() > self.max_entries {
                self.entries.remove(0);
            } else {
                self.cursor += 1;
            }
        }
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor])
    }

    /// Step forward one snapshot.
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor])
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

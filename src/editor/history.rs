//! Linear undo/redo history of tree snapshots
//!
//! Pushing after an undo discards the redo branch. A successful save collapses
//! the history to the saved snapshot.

use tracing::debug;

use crate::hierarchy::TreeNode;

/// Snapshot history for the tree editor
pub type HistoryManager = History<TreeNode>;

/// Ordered snapshots plus a cursor. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    entries: Vec<T>,
    index: usize,
}

impl<T> History<T> {
    /// Start a history whose only entry is `initial`
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.entries[self.index]
    }

    /// Record a new snapshot, dropping anything that could have been redone
    pub fn push(&mut self, snapshot: T) {
        let discarded = self.entries.len() - self.index - 1;
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        self.index += 1;
        debug!(index = self.index, discarded, "history push");
    }

    /// Step back one snapshot. `None` (and no change) at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        debug!(index = self.index, "history undo");
        Some(&self.entries[self.index])
    }

    /// Step forward one snapshot. `None` (and no change) at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        debug!(index = self.index, "history redo");
        Some(&self.entries[self.index])
    }

    /// Replace the whole history with a single entry
    pub fn reset_to(&mut self, snapshot: T) {
        self.entries = vec![snapshot];
        self.index = 0;
        debug!("history reset");
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_at_ends_are_noops() {
        let mut history = History::new(1);
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(*history.current(), 1);
    }

    #[test]
    fn test_undo_restores_previous() {
        let mut history = History::new(1);
        history.push(2);
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(*history.current(), 2);
    }

    #[test]
    fn test_push_after_undo_truncates() {
        let mut history = History::new(1);
        history.push(2);
        history.push(3);
        history.undo();
        history.push(4);
        assert_eq!(history.len(), 3);
        assert!(history.redo().is_none());
        assert_eq!(*history.current(), 4);
        assert_eq!(history.undo(), Some(&2));
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut history = History::new(1);
        history.push(2);
        history.push(3);
        history.reset_to(3);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
    }
}

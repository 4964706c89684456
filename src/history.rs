//! Undo/redo history of full scene snapshots.
//!
//! The history is a list of snapshots plus a cursor pointing at the snapshot
//! that matches the current scene. Committing truncates everything after the
//! cursor, appends a deep copy and evicts the oldest entry once the cap is
//! exceeded.

use std::collections::VecDeque;

/// Bounded snapshot history.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    /// Index of the snapshot matching the current state, if any was committed
    index: Option<usize>,
    cap: usize,
}

impl<T: Clone> History<T> {
    /// Creates an empty history keeping at most `cap` snapshots.
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap.max(1)),
            index: None,
            cap: cap.max(1),
        }
    }

    /// Records `state` as the newest snapshot, discarding any redo tail.
    pub fn commit(&mut self, state: &T) {
        if let Some(index) = self.index {
            self.entries.truncate(index + 1);
        } else {
            self.entries.clear();
        }
        self.entries.push_back(state.clone());
        let mut index = self.entries.len() - 1;
        if self.entries.len() > self.cap {
            self.entries.pop_front();
            index -= 1;
        }
        self.index = Some(index);
    }

    /// Steps back one snapshot and returns it, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        match self.index {
            Some(index) if index > 0 => {
                self.index = Some(index - 1);
                self.entries.get(index - 1)
            }
            _ => None,
        }
    }

    /// Steps forward one snapshot and returns it, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        match self.index {
            Some(index) if index + 1 < self.entries.len() => {
                self.index = Some(index + 1);
                self.entries.get(index + 1)
            }
            _ => None,
        }
    }

    /// Whether an older snapshot exists.
    pub fn can_undo(&self) -> bool {
        matches!(self.index, Some(index) if index > 0)
    }

    /// Whether a newer snapshot exists.
    pub fn can_redo(&self) -> bool {
        matches!(self.index, Some(index) if index + 1 < self.entries.len())
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no snapshot is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current snapshot.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Maximum number of retained snapshots.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_and_redo_walk_the_snapshots() {
        let mut history = History::new(10);
        for state in 0..4 {
            history.commit(&state);
        }

        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), Some(&0));
        assert_eq!(history.undo(), None);
        assert!(!history.can_undo());

        assert_eq!(history.redo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), Some(&3));
        assert_eq!(history.redo(), None);
        assert!(!history.can_redo());
    }

    #[test]
    fn commit_discards_redo_tail() {
        let mut history = History::new(10);
        history.commit(&"a");
        history.commit(&"b");
        history.commit(&"c");
        history.undo();
        history.undo();

        history.commit(&"d");

        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&"a"));
    }

    #[test]
    fn oldest_snapshot_is_evicted_at_cap() {
        let mut history = History::new(3);
        for state in 0..6 {
            history.commit(&state);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), Some(2));
        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn empty_history_is_a_no_op() {
        let mut history: History<u8> = History::new(3);
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert!(history.is_empty());
    }
}

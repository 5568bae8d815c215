#![forbid(unsafe_code)]

//! Bounded undo/redo history of immutable snapshots.
//!
//! Snapshots are held as [`Arc`]s, so saving the engine's current state
//! never copies it and restoring hands the same allocation back.
//!
//! ```text
//! save s0, s1, s2, s3
//!   past:   [s0, s1, s2, s3]   current = s3
//!   future: []
//!
//! undo, undo
//!   past:   [s0, s1]           current = s1
//!   future: [s3, s2]
//!
//! save s4 (future is dropped)
//!   past:   [s0, s1, s4]       current = s4
//!   future: []
//! ```
//!
//! # Invariants
//!
//! 1. `past.len() + future.len() <= capacity` after every operation.
//! 2. Saving clears the future.
//! 3. Undo never pops the last remaining snapshot.
//! 4. Restoring never creates a new snapshot.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Snapshot history with a fixed capacity; the oldest entry is evicted first.
pub struct SnapshotHistory<T> {
    /// Snapshots up to and including the current one (current at the back).
    past: VecDeque<Arc<T>>,
    /// Undone snapshots, most recently undone at the back.
    future: Vec<Arc<T>>,
    capacity: usize,
}

impl<T> fmt::Debug for SnapshotHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotHistory")
            .field("past", &self.past.len())
            .field("future", &self.future.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> SnapshotHistory<T> {
    /// Create an empty history. A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record `snapshot` as the new current state.
    pub fn save(&mut self, snapshot: Arc<T>) {
        self.future.clear();
        self.past.push_back(snapshot);
        while self.past.len() > self.capacity {
            let _ = self.past.pop_front();
        }
    }

    /// Step back one snapshot and return it, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<Arc<T>> {
        if self.past.len() < 2 {
            return None;
        }
        let current = self.past.pop_back()?;
        self.future.push(current);
        self.past.back().cloned()
    }

    /// Step forward one snapshot and return it, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<Arc<T>> {
        let snapshot = self.future.pop()?;
        self.past.push_back(snapshot);
        self.past.back().cloned()
    }

    /// The snapshot the history pointer is at.
    #[must_use]
    pub fn current(&self) -> Option<&Arc<T>> {
        self.past.back()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.past.len() >= 2
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Total retained snapshots on both sides of the pointer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.past.len() + self.future.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.past.is_empty() && self.future.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Zero-based position of the pointer among retained snapshots.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.past.len().checked_sub(1)
    }

    /// Drop everything and start over from `snapshot`.
    pub fn reset(&mut self, snapshot: Arc<T>) {
        self.past.clear();
        self.future.clear();
        self.past.push_back(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(values: &[u32], capacity: usize) -> SnapshotHistory<u32> {
        let mut history = SnapshotHistory::new(capacity);
        for &value in values {
            history.save(Arc::new(value));
        }
        history
    }

    #[test]
    fn empty_history_has_nothing_to_restore() {
        let mut history: SnapshotHistory<u32> = SnapshotHistory::new(4);
        assert!(history.is_empty());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(history.current().is_none());
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn single_snapshot_cannot_undo() {
        let mut history = history_of(&[1], 4);
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(history.current().map(|s| **s), Some(1));
    }

    #[test]
    fn undo_and_redo_walk_the_pointer() {
        let mut history = history_of(&[0, 1, 2, 3], 10);
        assert_eq!(history.undo().map(|s| *s), Some(2));
        assert_eq!(history.undo().map(|s| *s), Some(1));
        assert!(history.can_redo());
        assert_eq!(history.redo().map(|s| *s), Some(2));
        assert_eq!(history.redo().map(|s| *s), Some(3));
        assert!(history.redo().is_none());
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn save_after_undo_truncates_future() {
        let mut history = history_of(&[0, 1, 2, 3], 10);
        let _ = history.undo();
        let _ = history.undo();
        history.save(Arc::new(4));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo().map(|s| *s), Some(1));
        assert_eq!(history.undo().map(|s| *s), Some(0));
        assert!(history.undo().is_none());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = history_of(&(0..60).collect::<Vec<_>>(), 50);
        assert_eq!(history.len(), 50);
        let mut oldest = None;
        while let Some(snapshot) = history.undo() {
            oldest = Some(*snapshot);
        }
        assert_eq!(oldest, Some(10));
        assert_eq!(history.len(), 50);
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let history = history_of(&[1, 2, 3], 0);
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current().map(|s| **s), Some(3));
    }

    #[test]
    fn restoring_shares_the_saved_allocation() {
        let first = Arc::new(7u32);
        let mut history = SnapshotHistory::new(3);
        history.save(Arc::clone(&first));
        history.save(Arc::new(8));
        let restored = history.undo().unwrap();
        assert!(Arc::ptr_eq(&first, &restored));
    }

    #[test]
    fn reset_discards_both_sides() {
        let mut history = history_of(&[1, 2, 3], 5);
        let _ = history.undo();
        history.reset(Arc::new(9));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.cursor(), Some(0));
    }
}

//! Per-page undo history.
//!
//! The history is a list of full overlay snapshots with a cursor pointing
//! at the snapshot that is currently displayed. Every mutation commits a
//! new snapshot; undo moves the cursor back one step.
//!
//! Committing while the cursor is not at the end truncates everything
//! after the cursor. There is no redo: once a snapshot is truncated it is
//! gone.

use sp_core::{Error, OverlayObject, Result};

/// One page's overlay list at a point in time.
pub type Snapshot = Vec<OverlayObject>;

#[derive(Debug, Clone, PartialEq)]
pub struct PageHistory {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl Default for PageHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PageHistory {
    /// A fresh history holding only the initial empty snapshot.
    pub fn new() -> Self {
        Self {
            snapshots: vec![Vec::new()],
            cursor: 0,
        }
    }

    /// Record `snapshot` as the new current state, dropping any snapshots
    /// after the cursor.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot and return it.
    pub fn undo(&mut self) -> Result<&[OverlayObject]> {
        if self.cursor == 0 {
            return Err(Error::NoHistory);
        }
        self.cursor -= 1;
        Ok(&self.snapshots[self.cursor])
    }

    pub fn current(&self) -> &[OverlayObject] {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of stored snapshots, including the initial one.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: the initial snapshot is never removed.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Commits made since the initial snapshot that are still reachable.
    pub fn commit_count(&self) -> usize {
        self.snapshots.len() - 1
    }
}

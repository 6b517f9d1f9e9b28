//! Linear undo/redo over immutable document snapshots.
//!
//! Snapshots are shared `Arc`s, so an undo hands back a copy without
//! re-parsing anything. Pushing after an undo discards the redo branch;
//! branching history is not kept.
//!
//! An optional cap bounds memory for long sessions. Once the cap is reached
//! the oldest snapshot is evicted, which means the very first state of a
//! long session can no longer be reached by undo.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::models::resume::ResumeDocument;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Arc<ResumeDocument>>,
    cursor: usize,
    /// `None` means unbounded.
    limit: Option<usize>,
}

impl History {
    /// Starts a history holding `initial` as its only snapshot.
    pub fn new(initial: ResumeDocument, limit: Option<usize>) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(Arc::new(initial));
        Self {
            entries,
            cursor: 0,
            // A cap below 1 could not hold the current state.
            limit: limit.map(|l| l.max(1)),
        }
    }

    /// Records `doc` as the newest state, dropping anything after the cursor.
    pub fn push(&mut self, doc: ResumeDocument) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(Arc::new(doc));
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Steps back one snapshot. `None` (and no change) when already at the oldest.
    pub fn undo(&mut self) -> Option<ResumeDocument> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current().clone())
    }

    /// Steps forward one snapshot. `None` (and no change) when already at the newest.
    pub fn redo(&mut self) -> Option<ResumeDocument> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current().clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Replaces the whole history with a single snapshot of `doc`.
    pub fn reset(&mut self, doc: ResumeDocument) {
        self.entries.clear();
        self.entries.push_back(Arc::new(doc));
        self.cursor = 0;
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> &ResumeDocument {
        &self.entries[self.cursor]
    }

    /// Shared handle to the snapshot under the cursor.
    pub fn snapshot(&self) -> Arc<ResumeDocument> {
        Arc::clone(&self.entries[self.cursor])
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

//! Snapshot-based linear undo/redo.

use crate::document::Document;
use crate::error::EditorResult;

/// Maximum number of retained snapshots; the oldest is evicted beyond
/// this.
pub const MAX_HISTORY: usize = 100;

/// A bounded log of serialized document snapshots with a cursor.
///
/// The entry at `cursor` always matches the current document state, so a
/// fresh history holds one baseline snapshot. Capturing while a restore
/// is in flight is dropped; the replay guard exists so that mutation
/// notifications triggered by the restore itself cannot corrupt the log.
#[derive(Debug, Default)]
pub struct History {
    snapshots: Vec<String>,
    cursor: usize,
    replaying: bool,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the document's current state. Discards any redo tail past
    /// the cursor, then appends; evicts the oldest entry at capacity.
    pub fn capture(&mut self, document: &Document) -> EditorResult<()> {
        if self.replaying {
            log::debug!("history capture dropped: restore in progress");
            return Ok(());
        }
        let snapshot = document.to_json()?;
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(snapshot);
        if self.snapshots.len() > MAX_HISTORY {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Step back one snapshot and restore the document from it. The
    /// document and cursor are left untouched if there is nothing to
    /// undo or the snapshot fails to parse.
    pub fn undo(&mut self, document: &mut Document) -> EditorResult<bool> {
        if !self.can_undo() {
            return Ok(false);
        }
        self.restore(self.cursor - 1, document)?;
        Ok(true)
    }

    /// Step forward one snapshot and restore the document from it.
    pub fn redo(&mut self, document: &mut Document) -> EditorResult<bool> {
        if !self.can_redo() {
            return Ok(false);
        }
        self.restore(self.cursor + 1, document)?;
        Ok(true)
    }

    fn restore(&mut self, index: usize, document: &mut Document) -> EditorResult<()> {
        self.replaying = true;
        // Parse before assigning so a corrupt snapshot leaves everything
        // untouched; the guard is released on every path.
        let result = Document::from_json(&self.snapshots[index]);
        self.replaying = false;
        let restored = result?;
        *document = restored;
        self.cursor = index;
        Ok(())
    }
}

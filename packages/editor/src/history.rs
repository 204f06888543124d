//! # Undo/Redo History
//!
//! Tracks whole-document snapshots and enables undo/redo.
//!
//! ## Design
//!
//! - Before a tracked mutation, the pre-mutation forest is recorded
//! - Undo swaps the current forest for the most recent recorded one and
//!   keeps the current one for redo
//! - Redo is the mirror image
//! - Recording a new entry clears the redo stack
//! - Batches group several mutations into one undo step; only the state
//!   before the first mutation of the batch is kept
//! - Oldest entries are evicted past `max_levels`
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new();
//!
//! let before = doc.snapshot();
//! doc.add_block(block)?;
//! history.record(before, Some("Add text block".into()));
//!
//! if let Some(previous) = history.undo(doc.snapshot()) {
//!     doc.restore(previous);
//! }
//! ```

use crate::document::Forest;
use std::collections::VecDeque;
use tracing::debug;

/// Default number of undo levels
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One undo step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Document content on the other side of this step
    pub forest: Forest,

    /// Optional description of the step
    pub description: Option<String>,
}

#[derive(Debug)]
struct PendingBatch {
    before: Option<Forest>,
    description: Option<String>,
    depth: usize,
}

/// Snapshot-based undo/redo history
#[derive(Debug)]
pub struct History {
    /// States before each step (most recent last)
    past: VecDeque<HistoryEntry>,

    /// States undone from (most recent last)
    future: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    batch: Option<PendingBatch>,
}

impl History {
    /// Create a history with default max levels
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a history with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            max_levels,
            batch: None,
        }
    }

    /// Record the state before a tracked mutation
    ///
    /// Inside a batch only the first call is kept.
    pub fn record(&mut self, before: Forest, description: Option<String>) {
        if let Some(batch) = &mut self.batch {
            if batch.before.is_none() {
                batch.before = Some(before);
                if batch.description.is_none() {
                    batch.description = description;
                }
            }
            self.future.clear();
            return;
        }

        self.push(HistoryEntry {
            forest: before,
            description,
        });
    }

    /// Start a batch (mutations until `end_batch` undo together)
    ///
    /// Nested calls are counted; only the outermost `end_batch` commits.
    pub fn begin_batch(&mut self) {
        if let Some(batch) = &mut self.batch {
            batch.depth += 1;
            return;
        }
        self.batch = Some(PendingBatch {
            before: None,
            description: None,
            depth: 1,
        });
    }

    /// End the current batch and push it as one undo step
    pub fn end_batch(&mut self) {
        let Some(batch) = &mut self.batch else {
            return;
        };
        batch.depth -= 1;
        if batch.depth > 0 {
            return;
        }

        if let Some(batch) = self.batch.take() {
            if let Some(before) = batch.before {
                self.push(HistoryEntry {
                    forest: before,
                    description: batch.description,
                });
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.batch {
            batch.description = Some(description.into());
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch.is_some()
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.past.push_back(entry);

        if self.max_levels > 0 && self.past.len() > self.max_levels {
            self.past.pop_front();
            debug!(max_levels = self.max_levels, "Evicted oldest undo entry");
        }

        // New action invalidates the redo branch
        self.future.clear();
    }

    /// Step back; returns the forest to restore
    pub fn undo(&mut self, current: Forest) -> Option<Forest> {
        let entry = self.past.pop_back()?;
        self.future.push(HistoryEntry {
            forest: current,
            description: entry.description.clone(),
        });
        Some(entry.forest)
    }

    /// Step forward; returns the forest to restore
    pub fn redo(&mut self, current: Forest) -> Option<Forest> {
        let entry = self.future.pop()?;
        self.past.push_back(HistoryEntry {
            forest: current,
            description: entry.description.clone(),
        });
        Some(entry.forest)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.batch = None;
    }

    /// Description of the next undo step
    pub fn undo_description(&self) -> Option<&str> {
        self.past.back().and_then(|entry| entry.description.as_deref())
    }

    /// Description of the next redo step
    pub fn redo_description(&self) -> Option<&str> {
        self.future.last().and_then(|entry| entry.description.as_deref())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

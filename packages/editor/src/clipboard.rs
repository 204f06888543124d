//! Single-slot block clipboard.
//!
//! Copies are stored with every id cleared so the slot never shares
//! identifiers with the live document. Ids are assigned on paste, so
//! repeated pastes produce distinct blocks.

use crate::block::Block;
use crate::identity::strip_ids;

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<Block>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `block`, replacing any previous content
    pub fn copy(&mut self, block: &Block) {
        self.slot = Some(strip_ids(block));
    }

    pub fn peek(&self) -> Option<&Block> {
        self.slot.as_ref()
    }

    /// A fresh copy of the stored subtree for insertion
    pub fn contents(&self) -> Option<Block> {
        self.slot.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

//! # Edit Session
//!
//! The single owned store a page editor talks to. It owns the live
//! document together with undo history, clipboard, version snapshots and
//! the block registry, and exposes the editor's whole operation set.
//!
//! Every content change goes through [`EditSession::apply`]: the
//! pre-mutation snapshot is recorded in history only if the mutation
//! succeeds and actually changes something. Invalid references and
//! out-of-range indices are logged and ignored, never surfaced.

use crate::block::{Block, BlockId, Props};
use crate::clipboard::Clipboard;
use crate::clock::{Clock, SystemClock};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::errors::EditorError;
use crate::history::History;
use crate::identity::{strip_ids, IdGenerator};
use crate::mutations::{Mutation, MutationError, MutationResult};
use crate::preview::{preview, PreviewNode, PreviewOptions};
use crate::registry::BlockRegistry;
use crate::responsive::Viewport;
use crate::shortcuts::{KeyEvent, Shortcut};
use crate::versions::{Version, VersionManager};
use std::sync::Arc;
use tracing::{debug, info};

/// Persistence boundary invoked by [`EditSession::request_save`]
pub trait SaveHandler {
    fn save(&mut self, blocks: &[Block]);
}

impl<F: FnMut(&[Block])> SaveHandler for F {
    fn save(&mut self, blocks: &[Block]) {
        self(blocks)
    }
}

/// One editor instance over one page
#[derive(Debug)]
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    document: Document,
    history: History,
    clipboard: Clipboard,
    versions: VersionManager,
    registry: BlockRegistry,
    viewport: Viewport,

    /// Document version covered by the last completed save
    saved_version: u64,

    /// Document version being saved, while a save is in flight
    pending_save: Option<u64>,
}

impl EditSession {
    /// Empty page with the built-in registry
    pub fn new(id: impl Into<String>, config: &EditorConfig) -> Self {
        Self::with_clock(id, config, Arc::new(SystemClock))
    }

    pub fn with_clock(id: impl Into<String>, config: &EditorConfig, clock: Arc<dyn Clock>) -> Self {
        let id = id.into();
        let ids = match &config.id_prefix {
            Some(prefix) => IdGenerator::from_seed(prefix.as_str()),
            None => IdGenerator::new(&id),
        };

        Self {
            document: Document::new(ids).with_max_depth(config.max_nesting_depth),
            history: History::with_max_levels(config.history_limit),
            clipboard: Clipboard::new(),
            versions: VersionManager::new(config.version_limit, clock),
            registry: BlockRegistry::builtin(),
            viewport: Viewport::default(),
            saved_version: 0,
            pending_save: None,
            id,
        }
    }

    /// Open an existing page; loading is not an undo step
    pub fn from_blocks(
        id: impl Into<String>,
        blocks: Vec<Block>,
        config: &EditorConfig,
    ) -> Result<Self, EditorError> {
        let mut session = Self::new(id, config);
        session.load(blocks)?;
        Ok(session)
    }

    /// Replace the page outright, clearing history
    pub fn load(&mut self, mut blocks: Vec<Block>) -> Result<(), EditorError> {
        for block in &mut blocks {
            self.registry.conform(block);
        }
        self.document.set_blocks(blocks)?;
        self.document.select(None);
        self.history.clear();
        self.saved_version = self.document.version;
        info!(session_id = %self.id, blocks = self.document.total_blocks(), "Loaded page");
        Ok(())
    }

    pub fn with_registry(mut self, registry: BlockRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut BlockRegistry {
        &mut self.registry
    }

    /// Apply a tracked mutation
    ///
    /// Incoming blocks are first conformed to the registry schema. Returns
    /// `None` when the mutation was rejected; the document and history are
    /// then unchanged. A mutation that succeeds without changing content
    /// leaves history and the document version alone.
    pub fn apply(&mut self, mut mutation: Mutation) -> Option<MutationResult> {
        if let Err(err) = self.conform(&mut mutation) {
            debug!(mutation = mutation.name(), error = %err, "Ignored mutation");
            return None;
        }
        let before = self.document.snapshot();
        let version = self.document.version;

        match mutation.apply(&mut self.document) {
            Ok(mut result) => {
                if self.document.forest() == &before {
                    self.document.version = version;
                    result.version = version;
                    debug!(mutation = mutation.name(), "Mutation had no effect");
                } else {
                    self.history.record(before, Some(mutation.description()));
                }
                debug!(
                    session_id = %self.id,
                    mutation = mutation.name(),
                    version = result.version,
                    created = result.created.len(),
                    removed = result.removed.len(),
                    "Applied mutation"
                );
                Some(result)
            }
            Err(err) => {
                debug!(mutation = mutation.name(), error = %err, "Ignored mutation");
                None
            }
        }
    }

    /// Match block payloads to the registry schema; reject nesting into a
    /// field the parent's type does not declare as a block list
    fn conform(&self, mutation: &mut Mutation) -> Result<(), MutationError> {
        match mutation {
            Mutation::AddBlock { block } | Mutation::InsertBlock { block, .. } => {
                self.registry.conform(block);
            }
            Mutation::NestBlock {
                block,
                parent,
                slot,
                ..
            } => {
                let parent_type = self
                    .document
                    .block_type(parent)
                    .ok_or_else(|| MutationError::ParentNotFound(parent.clone()))?;
                if self.registry.declares_slot(parent_type, slot) == Some(false) {
                    return Err(MutationError::NotASlot(slot.clone()));
                }
                self.registry.conform(block);
            }
            Mutation::UpdateBlock { id, props } => {
                if let Some(block_type) = self.document.block_type(id) {
                    self.registry.conform_props(block_type, props);
                }
            }
            Mutation::SetBlocks { blocks } | Mutation::InsertTemplate { blocks } => {
                for block in blocks {
                    self.registry.conform(block);
                }
            }
            Mutation::RemoveBlock { .. }
            | Mutation::MoveBlock { .. }
            | Mutation::DuplicateBlock { .. } => {}
        }
        Ok(())
    }

    // ---- blocks ----

    /// Append a block seeded with registry defaults, select it
    pub fn add_block(&mut self, mut block: Block) -> Option<BlockId> {
        self.registry.apply_defaults(&mut block);
        self.apply(Mutation::AddBlock { block })
            .and_then(|result| result.created.into_iter().next())
    }

    /// Append a new block of `block_type` with default props
    pub fn add_block_of_type(&mut self, block_type: &str) -> Option<BlockId> {
        self.add_block(Block::new(block_type))
    }

    /// Insert a new block into `parent`'s `slot` at `index`, select it
    pub fn nest_block(
        &mut self,
        parent: &str,
        slot: &str,
        index: usize,
        mut block: Block,
    ) -> Option<BlockId> {
        self.registry.apply_defaults(&mut block);
        self.apply(Mutation::NestBlock {
            block,
            parent: parent.to_string(),
            slot: slot.to_string(),
            index,
        })
        .and_then(|result| result.created.into_iter().next())
    }

    pub fn remove_block(&mut self, id: &str) -> bool {
        self.apply(Mutation::RemoveBlock { id: id.to_string() })
            .is_some()
    }

    pub fn update_block(&mut self, id: &str, props: Props) -> bool {
        self.apply(Mutation::UpdateBlock {
            id: id.to_string(),
            props,
        })
        .is_some()
    }

    pub fn move_block(&mut self, from: usize, to: usize) -> bool {
        self.apply(Mutation::MoveBlock { from, to }).is_some()
    }

    pub fn duplicate_block(&mut self, id: &str) -> Option<BlockId> {
        self.apply(Mutation::DuplicateBlock { id: id.to_string() })
            .and_then(|result| result.created.into_iter().next())
    }

    pub fn set_blocks(&mut self, blocks: Vec<Block>) -> bool {
        self.apply(Mutation::SetBlocks { blocks }).is_some()
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.document.blocks()
    }

    pub fn block(&self, id: &str) -> Option<Block> {
        self.document.block(id)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(Block::list_to_json(&self.document.blocks())?)
    }

    // ---- templates ----

    /// Append template blocks with fresh ids and registry defaults
    pub fn insert_template(&mut self, blocks: Vec<Block>) -> Vec<BlockId> {
        let blocks = self.prepare_template(blocks);
        self.apply(Mutation::InsertTemplate { blocks })
            .map(|result| result.created)
            .unwrap_or_default()
    }

    /// Replace the page with a template
    pub fn apply_template(&mut self, blocks: Vec<Block>) -> bool {
        let blocks = self.prepare_template(blocks);
        self.set_blocks(blocks)
    }

    fn prepare_template(&self, blocks: Vec<Block>) -> Vec<Block> {
        blocks
            .iter()
            .map(|block| {
                let mut block = strip_ids(block);
                self.registry.apply_defaults(&mut block);
                block
            })
            .collect()
    }

    // ---- selection & visibility ----

    pub fn select_block(&mut self, id: Option<&str>) -> bool {
        self.document.select(id)
    }

    pub fn selected_block_id(&self) -> Option<&str> {
        self.document.selected()
    }

    pub fn selected_block(&self) -> Option<Block> {
        self.document.selected().and_then(|id| self.document.block(id))
    }

    pub fn toggle_block_visibility(&mut self, id: &str) -> bool {
        self.document.toggle_visibility(id)
    }

    pub fn is_block_visible(&self, id: &str) -> bool {
        self.document.is_visible(id)
    }

    // ---- history ----

    pub fn undo(&mut self) -> bool {
        if self.history.is_batching() {
            debug!("Undo ignored while batching");
            return false;
        }
        if !self.history.can_undo() {
            return false;
        }

        let current = self.document.snapshot();
        match self.history.undo(current) {
            Some(forest) => {
                self.document.restore(forest);
                debug!(session_id = %self.id, version = self.document.version, "Undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.history.is_batching() || !self.history.can_redo() {
            return false;
        }

        let current = self.document.snapshot();
        match self.history.redo(current) {
            Some(forest) => {
                self.document.restore(forest);
                debug!(session_id = %self.id, version = self.document.version, "Redo");
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    /// Group following mutations into one undo step
    pub fn begin_batch(&mut self) {
        self.history.begin_batch();
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        self.history.set_batch_description(description);
    }

    // ---- clipboard ----

    pub fn copy_block(&mut self, id: &str) -> bool {
        match self.document.block(id) {
            Some(block) => {
                self.clipboard.copy(&block);
                debug!(block_id = %id, "Copied block");
                true
            }
            None => {
                debug!(block_id = %id, "Copy ignored, block not found");
                false
            }
        }
    }

    /// Insert the clipboard after the selected block (or at the end)
    pub fn paste_block(&mut self) -> Option<BlockId> {
        let Some(block) = self.clipboard.contents() else {
            debug!(error = %MutationError::EmptyClipboard, "Paste ignored");
            return None;
        };
        let after = self.document.selected().map(str::to_string);

        self.apply(Mutation::InsertBlock { block, after })
            .and_then(|result| result.created.into_iter().next())
    }

    pub fn has_clipboard(&self) -> bool {
        !self.clipboard.is_empty()
    }

    // ---- versions ----

    /// Capture the current page as a named version
    pub fn save_version(&mut self, label: Option<&str>) -> String {
        self.versions
            .save(label.map(str::to_string), self.document.blocks())
    }

    /// Replace the page with a saved version (one undo step)
    pub fn restore_version(&mut self, id: &str) -> bool {
        let Some(blocks) = self.versions.restore(id) else {
            let error = MutationError::VersionNotFound(id.to_string());
            debug!(error = %error, "Restore ignored");
            return false;
        };
        let restored = self.set_blocks(blocks);
        if restored {
            info!(session_id = %self.id, version_id = %id, "Restored version");
        }
        restored
    }

    pub fn delete_version(&mut self, id: &str) -> bool {
        self.versions.delete(id)
    }

    /// Newest first
    pub fn versions(&self) -> &[Version] {
        self.versions.list()
    }

    pub fn versions_json(&self) -> Result<String, EditorError> {
        Ok(self.versions.to_json()?)
    }

    pub fn load_versions_json(&mut self, json: &str) -> Result<(), EditorError> {
        self.versions.load_json(json)?;
        Ok(())
    }

    // ---- preview ----

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Render the page for the current viewport, hidden blocks skipped
    pub fn preview(&self) -> Vec<PreviewNode> {
        self.preview_with(PreviewOptions {
            viewport: self.viewport,
            include_hidden: false,
        })
    }

    pub fn preview_with(&self, options: PreviewOptions) -> Vec<PreviewNode> {
        preview(&self.document, &self.registry, options)
    }

    // ---- saving ----

    /// Hand the page to `handler` unless a save is already in flight
    pub fn request_save(&mut self, handler: &mut impl SaveHandler) -> bool {
        if let Some(version) = self.pending_save {
            debug!(version, "Save already in progress");
            return false;
        }

        let version = self.document.version;
        self.pending_save = Some(version);
        let blocks = self.document.blocks();
        info!(session_id = %self.id, version, blocks = blocks.len(), "Saving page");
        handler.save(&blocks);
        true
    }

    /// Report the outcome of the in-flight save
    pub fn save_completed(&mut self, success: bool) {
        let Some(version) = self.pending_save.take() else {
            return;
        };
        if success {
            self.saved_version = version;
        }
        debug!(version, success, "Save completed");
    }

    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    /// Content changed since the last successful save
    pub fn is_dirty(&self) -> bool {
        self.document.version != self.saved_version
    }

    // ---- keyboard ----

    /// Run the action bound to a key event
    ///
    /// Returns the recognized shortcut. `Save` is only reported; the host
    /// owns the handler and calls [`EditSession::request_save`].
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<Shortcut> {
        let shortcut = Shortcut::from_event(event)?;
        let selected = self.document.selected().map(str::to_string);

        match shortcut {
            Shortcut::Undo => {
                self.undo();
            }
            Shortcut::Redo => {
                self.redo();
            }
            Shortcut::Copy => {
                if let Some(id) = &selected {
                    self.copy_block(id);
                }
            }
            Shortcut::Paste => {
                self.paste_block();
            }
            Shortcut::Duplicate => {
                if let Some(id) = &selected {
                    self.duplicate_block(id);
                }
            }
            Shortcut::Delete => {
                if let Some(id) = &selected {
                    self.remove_block(id);
                }
            }
            Shortcut::Deselect => {
                self.document.select(None);
            }
            Shortcut::Save => {}
        }

        debug!(?shortcut, "Handled shortcut");
        Some(shortcut)
    }
}

//! # Document Mutations
//!
//! Every undo-tracked edit, expressed as a serializable command.
//!
//! ## Mutation Semantics
//!
//! ### AddBlock / InsertTemplate
//! - Append to the top level; new blocks are selected
//! - AddBlock keeps a supplied id if it is unused; templates always get fresh ids
//!
//! ### InsertBlock
//! - Fresh ids throughout, inserted right after `after` in the same list
//! - Falls back to the end of the top level when `after` is absent or gone
//!
//! ### NestBlock
//! - Inserts into an existing container slot at `index` (clamped), selects it
//! - The session only accepts slots the registry declares as block lists
//!
//! ### RemoveBlock
//! - Removes the block and all nested blocks
//!
//! ### UpdateBlock
//! - Shallow merge; each supplied key replaces the old value wholesale
//!
//! ### MoveBlock
//! - Top-level reorder; equal or out-of-range indices are rejected
//!
//! Failed mutations leave the document untouched.

use crate::block::{Block, BlockId, Props};
use crate::document::{Document, IdPolicy, Location};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Undo-tracked document edits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    /// Append a block (assigning an id if absent) and select it
    AddBlock { block: Block },

    /// Insert a copy with fresh ids after another block (paste)
    InsertBlock {
        block: Block,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<BlockId>,
    },

    /// Insert a block into a container slot
    NestBlock {
        block: Block,
        parent: BlockId,
        slot: String,
        #[serde(default)]
        index: usize,
    },

    /// Remove a block and its descendants
    RemoveBlock { id: BlockId },

    /// Shallow-merge props into a block
    UpdateBlock { id: BlockId, props: Props },

    /// Reorder the top-level list
    MoveBlock { from: usize, to: usize },

    /// Clone a block right after itself
    DuplicateBlock { id: BlockId },

    /// Replace the whole page
    SetBlocks { blocks: Vec<Block> },

    /// Append template blocks with fresh ids
    InsertTemplate { blocks: Vec<Block> },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Index {index} out of range for {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Nesting depth {depth} exceeds limit of {max}")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("Prop is not a block list: {0}")]
    NotASlot(String),

    #[error("Mutation has no effect")]
    Unchanged,

    #[error("Clipboard is empty")]
    EmptyClipboard,

    #[error("Version not found: {0}")]
    VersionNotFound(String),
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutationResult {
    /// Document version after the mutation
    pub version: u64,

    /// Root ids of newly created blocks
    pub created: Vec<BlockId>,

    /// Every id removed from the forest
    pub removed: Vec<BlockId>,
}

impl Mutation {
    /// Apply to the document
    pub fn apply(&self, doc: &mut Document) -> Result<MutationResult, MutationError> {
        let mut result = MutationResult::default();

        match self {
            Mutation::AddBlock { block } => {
                result.created.push(doc.add_block(block.clone())?);
            }

            Mutation::InsertBlock { block, after } => {
                let id = doc.insert_after(block.clone(), after.as_deref(), IdPolicy::Fresh)?;
                doc.select(Some(id.as_str()));
                result.created.push(id);
            }

            Mutation::NestBlock {
                block,
                parent,
                slot,
                index,
            } => {
                let at = Location::nested(parent.as_str(), slot.as_str(), *index);
                let id = doc.insert_block(block.clone(), at, IdPolicy::Keep)?;
                doc.select(Some(id.as_str()));
                result.created.push(id);
            }

            Mutation::RemoveBlock { id } => {
                result.removed = doc.remove_block(id)?;
            }

            Mutation::UpdateBlock { id, props } => {
                let before: Vec<BlockId> = doc
                    .block(id)
                    .map(|block| block.ids().into_iter().map(str::to_string).collect())
                    .unwrap_or_default();
                doc.update_block(id, props.clone())?;
                result.removed = before.into_iter().filter(|id| !doc.contains(id)).collect();
            }

            Mutation::MoveBlock { from, to } => {
                doc.move_block(*from, *to)?;
            }

            Mutation::DuplicateBlock { id } => {
                result.created.push(doc.duplicate_block(id)?);
            }

            Mutation::SetBlocks { blocks } => {
                let before: Vec<BlockId> = doc.outline().into_iter().map(|entry| entry.id).collect();
                doc.set_blocks(blocks.clone())?;
                result.removed = before.into_iter().filter(|id| !doc.contains(id)).collect();
                result.created = doc.top_level_ids().to_vec();
            }

            Mutation::InsertTemplate { blocks } => {
                if blocks.is_empty() {
                    return Err(MutationError::Unchanged);
                }
                if let Some(max) = doc.max_depth() {
                    if let Some(depth) = blocks.iter().map(Block::height).find(|h| *h > max) {
                        return Err(MutationError::NestingTooDeep { depth, max });
                    }
                }
                for block in blocks {
                    let id = doc.insert_after(block.clone(), None, IdPolicy::Fresh)?;
                    result.created.push(id);
                }
                if let Some(first) = result.created.first() {
                    doc.select(Some(first.as_str()));
                }
            }
        }

        result.version = doc.version;
        Ok(result)
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddBlock { .. } => "add_block",
            Mutation::InsertBlock { .. } => "insert_block",
            Mutation::NestBlock { .. } => "nest_block",
            Mutation::RemoveBlock { .. } => "remove_block",
            Mutation::UpdateBlock { .. } => "update_block",
            Mutation::MoveBlock { .. } => "move_block",
            Mutation::DuplicateBlock { .. } => "duplicate_block",
            Mutation::SetBlocks { .. } => "set_blocks",
            Mutation::InsertTemplate { .. } => "insert_template",
        }
    }

    /// Label shown next to undo/redo
    pub fn description(&self) -> String {
        match self {
            Mutation::AddBlock { block } => format!("Add {} block", block.block_type),
            Mutation::InsertBlock { block, .. } => format!("Paste {} block", block.block_type),
            Mutation::NestBlock { block, .. } => format!("Add {} block", block.block_type),
            Mutation::RemoveBlock { .. } => "Remove block".to_string(),
            Mutation::UpdateBlock { props, .. } => match props.len() {
                1 => format!("Edit {}", props.keys().next().map_or("", String::as_str)),
                _ => "Edit block".to_string(),
            },
            Mutation::MoveBlock { .. } => "Move block".to_string(),
            Mutation::DuplicateBlock { .. } => "Duplicate block".to_string(),
            Mutation::SetBlocks { .. } => "Replace page".to_string(),
            Mutation::InsertTemplate { blocks } => format!("Insert {} blocks", blocks.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdGenerator;
    use serde_json::json;

    fn doc_with(blocks: Vec<Block>) -> Document {
        Document::from_blocks(blocks, IdGenerator::from_seed("m")).unwrap()
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::MoveBlock { from: 0, to: 2 };
        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(json, json!({ "op": "moveBlock", "from": 0, "to": 2 }));

        let parsed: Mutation = serde_json::from_value(json!({
            "op": "updateBlock",
            "id": "a",
            "props": { "alignment": "center" }
        }))
        .unwrap();
        let Mutation::UpdateBlock { id, props } = parsed else {
            panic!("expected updateBlock");
        };
        assert_eq!(id, "a");
        assert_eq!(props["alignment"].as_str(), Some("center"));
    }

    #[test]
    fn test_insert_block_uses_fresh_ids_and_selects() {
        let mut doc = doc_with(vec![Block::new("text").with_id("a"), Block::new("text").with_id("b")]);

        let mutation = Mutation::InsertBlock {
            block: Block::new("text").with_id("a"),
            after: Some("a".to_string()),
        };
        let result = mutation.apply(&mut doc).unwrap();

        let new_id = &result.created[0];
        assert_ne!(new_id, "a");
        assert_eq!(doc.top_level_ids()[1], *new_id);
        assert_eq!(doc.selected(), Some(new_id.as_str()));
    }

    #[test]
    fn test_nest_block_into_slot() {
        let mut doc = doc_with(vec![Block::new("row")
            .with_id("r")
            .with_prop("left", vec![Block::new("text").with_id("n")])]);

        let mutation: Mutation = serde_json::from_value(json!({
            "op": "nestBlock",
            "block": { "type": "button", "props": {} },
            "parent": "r",
            "slot": "left"
        }))
        .unwrap();
        let result = mutation.apply(&mut doc).unwrap();

        let id = &result.created[0];
        assert_eq!(doc.location(id), Some(Location::nested("r", "left", 0)));
        assert_eq!(doc.selected(), Some(id.as_str()));
    }

    #[test]
    fn test_remove_reports_cascade() {
        let mut doc = doc_with(vec![Block::new("row")
            .with_id("r")
            .with_prop("left", vec![Block::new("text").with_id("n")])]);

        let result = Mutation::RemoveBlock { id: "r".to_string() }.apply(&mut doc).unwrap();
        assert_eq!(result.removed.len(), 2);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_insert_template_appends_with_fresh_ids() {
        let mut doc = doc_with(vec![Block::new("text").with_id("a")]);

        let template = vec![Block::new("hero"), Block::new("text").with_id("a")];
        let result = Mutation::InsertTemplate { blocks: template }.apply(&mut doc).unwrap();

        assert_eq!(result.created.len(), 2);
        assert_eq!(doc.len(), 3);
        assert!(!result.created.contains(&"a".to_string()));
        assert_eq!(doc.selected(), Some(result.created[0].as_str()));
    }

    #[test]
    fn test_failed_mutation_leaves_document_untouched() {
        let mut doc = doc_with(vec![Block::new("text").with_id("a")]);
        let before = doc.snapshot();

        let err = Mutation::UpdateBlock {
            id: "ghost".to_string(),
            props: Props::new(),
        }
        .apply(&mut doc)
        .unwrap_err();

        assert_eq!(err, MutationError::BlockNotFound("ghost".to_string()));
        assert_eq!(doc.snapshot(), before);
    }

    #[test]
    fn test_descriptions() {
        let add = Mutation::AddBlock { block: Block::new("hero") };
        assert_eq!(add.description(), "Add hero block");
        assert_eq!(add.name(), "add_block");

        let mut props = Props::new();
        props.insert("title".to_string(), "Hi".into());
        let update = Mutation::UpdateBlock { id: "a".to_string(), props };
        assert_eq!(update.description(), "Edit title");
    }
}

//! # Document Store
//!
//! Arena storage for the block forest.
//!
//! Blocks live in a flat map keyed by id. Ordering is kept separately: the
//! top-level list, plus one list per nested slot on each container node.
//! Every nested node records its parent so removal and location lookups never
//! walk the tree.
//!
//! ```text
//! root:  [a, b]
//! nodes: a → text
//!        b → row   slots { left: [c] }
//!        c → button parent (b, left)
//! ```
//!
//! Only the [`Forest`] (nodes + ordering) is undo-tracked. Selection and
//! preview visibility are UI state and are pruned whenever the forest
//! changes underneath them.

use crate::block::{Block, BlockId, PropValue, Props};
use crate::identity::IdGenerator;
use crate::mutations::MutationError;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Reference from a nested block to the slot that holds it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentRef {
    pub block_id: BlockId,
    pub slot: String,
}

/// Position of a block within its containing list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// `None` for the top-level list
    pub parent: Option<ParentRef>,
    pub index: usize,
}

impl Location {
    pub fn top_level(index: usize) -> Self {
        Self {
            parent: None,
            index,
        }
    }

    pub fn nested(block_id: impl Into<BlockId>, slot: impl Into<String>, index: usize) -> Self {
        Self {
            parent: Some(ParentRef {
                block_id: block_id.into(),
                slot: slot.into(),
            }),
            index,
        }
    }
}

/// How ids of inserted blocks are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// Keep incoming ids when present and unused, otherwise generate
    Keep,
    /// Always generate
    Fresh,
}

/// One row of the navigator outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub id: BlockId,
    pub block_type: String,
    pub depth: usize,
    /// Slot name for nested blocks
    pub slot: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    block_type: String,
    /// Non-block props
    values: BTreeMap<String, PropValue>,
    /// Nested block lists
    slots: BTreeMap<String, Vec<BlockId>>,
    parent: Option<ParentRef>,
}

/// Undo-tracked document content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    nodes: HashMap<BlockId, Node>,
    root: Vec<BlockId>,
}

impl Forest {
    /// Number of top-level blocks
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of blocks at every level
    pub fn total(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn root_ids(&self) -> &[BlockId] {
        &self.root
    }

    /// Materialize the subtree rooted at `id`
    pub fn block(&self, id: &str) -> Option<Block> {
        let node = self.nodes.get(id)?;
        let mut props = node.values.clone();
        for (slot, children) in &node.slots {
            let blocks = children.iter().filter_map(|child| self.block(child)).collect();
            props.insert(slot.clone(), PropValue::Blocks(blocks));
        }

        Some(Block {
            id: id.to_string(),
            block_type: node.block_type.clone(),
            props,
        })
    }

    /// Materialize the whole top-level list
    pub fn blocks(&self) -> Vec<Block> {
        self.root.iter().filter_map(|id| self.block(id)).collect()
    }
}

/// Editable block document
#[derive(Debug)]
pub struct Document {
    /// Increments on each successful mutation
    pub version: u64,

    forest: Forest,
    selected: Option<BlockId>,
    hidden: HashSet<BlockId>,
    ids: IdGenerator,
    max_depth: Option<usize>,
}

impl Document {
    /// Create an empty document
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            version: 0,
            forest: Forest::default(),
            selected: None,
            hidden: HashSet::new(),
            ids,
            max_depth: None,
        }
    }

    /// Load a page; ids are kept where unique
    pub fn from_blocks(blocks: Vec<Block>, ids: IdGenerator) -> Result<Self, MutationError> {
        let mut doc = Self::new(ids);
        doc.set_blocks(blocks)?;
        doc.version = 0;
        Ok(doc)
    }

    /// Limit how many ancestors a block may have (`None` = unlimited)
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Copy of the undo-tracked content
    pub fn snapshot(&self) -> Forest {
        self.forest.clone()
    }

    /// Replace the content with a snapshot, dropping stale UI references
    pub fn restore(&mut self, forest: Forest) {
        self.forest = forest;
        self.prune_ui_state();
        self.version += 1;
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.forest.blocks()
    }

    pub fn block(&self, id: &str) -> Option<Block> {
        self.forest.block(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.forest.contains(id)
    }

    /// Number of top-level blocks
    pub fn len(&self) -> usize {
        self.forest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    pub fn total_blocks(&self) -> usize {
        self.forest.total()
    }

    pub fn top_level_ids(&self) -> &[BlockId] {
        self.forest.root_ids()
    }

    pub fn block_type(&self, id: &str) -> Option<&str> {
        self.forest.nodes.get(id).map(|node| node.block_type.as_str())
    }

    /// Non-block prop of a block
    pub fn prop(&self, id: &str, key: &str) -> Option<&PropValue> {
        self.forest.nodes.get(id)?.values.get(key)
    }

    pub fn location(&self, id: &str) -> Option<Location> {
        let parent = self.forest.nodes.get(id)?.parent.clone();
        let index = self.list(parent.as_ref()).iter().position(|x| x == id)?;
        Some(Location { parent, index })
    }

    /// Number of ancestors (0 for top-level blocks)
    pub fn depth(&self, id: &str) -> Option<usize> {
        self.forest.nodes.get(id)?;
        Some(self.ancestors(id).len())
    }

    /// Ancestor ids, nearest first
    pub fn ancestors(&self, id: &str) -> Vec<BlockId> {
        let mut ancestors = Vec::new();
        let mut current = self.forest.nodes.get(id).and_then(|node| node.parent.as_ref());
        while let Some(parent) = current {
            ancestors.push(parent.block_id.clone());
            current = self
                .forest
                .nodes
                .get(&parent.block_id)
                .and_then(|node| node.parent.as_ref());
        }
        ancestors
    }

    /// Depth-first listing of every block for the navigator
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let mut entries = Vec::new();
        for id in &self.forest.root {
            self.outline_into(id, 0, None, &mut entries);
        }
        entries
    }

    fn outline_into(
        &self,
        id: &str,
        depth: usize,
        slot: Option<&str>,
        entries: &mut Vec<OutlineEntry>,
    ) {
        let Some(node) = self.forest.nodes.get(id) else {
            return;
        };
        entries.push(OutlineEntry {
            id: id.to_string(),
            block_type: node.block_type.clone(),
            depth,
            slot: slot.map(str::to_string),
            hidden: self.hidden.contains(id),
        });
        for (slot, children) in &node.slots {
            for child in children {
                self.outline_into(child, depth + 1, Some(slot.as_str()), entries);
            }
        }
    }

    // ---- tracked mutations ----

    /// Append to the top-level list and select it
    pub fn add_block(&mut self, block: Block) -> Result<BlockId, MutationError> {
        let at = Location::top_level(self.forest.root.len());
        let id = self.insert_block(block, at, IdPolicy::Keep)?;
        self.selected = Some(id.clone());
        Ok(id)
    }

    /// Insert a subtree at `at` (index clamped to the list length)
    pub fn insert_block(
        &mut self,
        block: Block,
        at: Location,
        policy: IdPolicy,
    ) -> Result<BlockId, MutationError> {
        if let Some(parent) = &at.parent {
            let node = self
                .forest
                .nodes
                .get(&parent.block_id)
                .ok_or_else(|| MutationError::ParentNotFound(parent.block_id.clone()))?;
            if node.values.contains_key(&parent.slot) {
                return Err(MutationError::NotASlot(parent.slot.clone()));
            }
        }
        self.check_depth(at.parent.as_ref(), &block)?;

        let index = at.index.min(self.list(at.parent.as_ref()).len());
        let id = self.insert_tree(block, at.parent.clone(), policy);
        if let Some(list) = self.list_mut(at.parent.as_ref()) {
            list.insert(index, id.clone());
        }

        self.version += 1;
        debug!(block_id = %id, index, nested = at.parent.is_some(), "Inserted block");
        Ok(id)
    }

    /// Insert right after `after` in the same list, or at the end of the
    /// top-level list when `after` is `None` or missing
    pub fn insert_after(
        &mut self,
        block: Block,
        after: Option<&str>,
        policy: IdPolicy,
    ) -> Result<BlockId, MutationError> {
        let at = match after.and_then(|id| self.location(id)) {
            Some(location) => Location {
                parent: location.parent,
                index: location.index + 1,
            },
            None => Location::top_level(self.forest.root.len()),
        };
        self.insert_block(block, at, policy)
    }

    /// Remove a block and everything nested inside it
    ///
    /// Returns the removed ids.
    pub fn remove_block(&mut self, id: &str) -> Result<Vec<BlockId>, MutationError> {
        if !self.forest.contains(id) {
            return Err(MutationError::BlockNotFound(id.to_string()));
        }

        self.detach(id);
        let mut removed = Vec::new();
        self.remove_tree(id, &mut removed);
        self.prune_ui_state();

        self.version += 1;
        debug!(block_id = %id, removed = removed.len(), "Removed block");
        Ok(removed)
    }

    /// Shallow-merge `partial` into the block's props
    ///
    /// Replacing a nested block list drops the old subtree from the forest
    /// and inserts the new one.
    pub fn update_block(&mut self, id: &str, partial: Props) -> Result<(), MutationError> {
        if !self.forest.contains(id) {
            return Err(MutationError::BlockNotFound(id.to_string()));
        }

        for (key, value) in &partial {
            if let PropValue::Blocks(children) = value {
                let parent = ParentRef {
                    block_id: id.to_string(),
                    slot: key.clone(),
                };
                for child in children {
                    self.check_depth(Some(&parent), child)?;
                }
            }
        }

        let mut removed = Vec::new();
        for (key, value) in partial {
            let old_children = self
                .forest
                .nodes
                .get_mut(id)
                .and_then(|node| node.slots.remove(&key));
            for child in old_children.unwrap_or_default() {
                self.remove_tree(&child, &mut removed);
            }

            match value {
                PropValue::Blocks(children) => {
                    let parent = ParentRef {
                        block_id: id.to_string(),
                        slot: key.clone(),
                    };
                    let child_ids: Vec<BlockId> = children
                        .into_iter()
                        .map(|child| self.insert_tree(child, Some(parent.clone()), IdPolicy::Keep))
                        .collect();
                    if let Some(node) = self.forest.nodes.get_mut(id) {
                        node.values.remove(&key);
                        node.slots.insert(key, child_ids);
                    }
                }
                other => {
                    if let Some(node) = self.forest.nodes.get_mut(id) {
                        node.values.insert(key, other);
                    }
                }
            }
        }
        self.prune_ui_state();

        self.version += 1;
        debug!(block_id = %id, replaced_nested = removed.len(), "Updated block");
        Ok(())
    }

    /// Reorder the top-level list
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<(), MutationError> {
        let len = self.forest.root.len();
        if from >= len || to >= len {
            let index = if from >= len { from } else { to };
            return Err(MutationError::IndexOutOfRange { index, len });
        }
        if from == to {
            return Err(MutationError::Unchanged);
        }

        let id = self.forest.root.remove(from);
        self.forest.root.insert(to, id);

        self.version += 1;
        debug!(from, to, "Moved block");
        Ok(())
    }

    /// Clone a subtree with fresh ids right after the original and select it
    pub fn duplicate_block(&mut self, id: &str) -> Result<BlockId, MutationError> {
        let source = self
            .forest
            .block(id)
            .ok_or_else(|| MutationError::BlockNotFound(id.to_string()))?;
        let location = self
            .location(id)
            .ok_or_else(|| MutationError::BlockNotFound(id.to_string()))?;

        let at = Location {
            parent: location.parent,
            index: location.index + 1,
        };
        let new_id = self.insert_block(source, at, IdPolicy::Fresh)?;
        self.selected = Some(new_id.clone());
        Ok(new_id)
    }

    /// Replace the whole forest
    pub fn set_blocks(&mut self, blocks: Vec<Block>) -> Result<(), MutationError> {
        for block in &blocks {
            self.check_depth(None, block)?;
        }

        self.forest = Forest::default();
        for block in blocks {
            let id = self.insert_tree(block, None, IdPolicy::Keep);
            self.forest.root.push(id);
        }
        self.prune_ui_state();

        self.version += 1;
        debug!(blocks = self.forest.total(), "Replaced document");
        Ok(())
    }

    // ---- UI state (not undo-tracked) ----

    /// Select a block, or clear the selection with `None`
    ///
    /// Selecting a missing id is a no-op and returns false.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if !self.forest.contains(id) => false,
            Some(id) => {
                self.selected = Some(id.to_string());
                true
            }
            None => {
                self.selected = None;
                true
            }
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Flip preview visibility; returns false for missing ids
    pub fn toggle_visibility(&mut self, id: &str) -> bool {
        if !self.forest.contains(id) {
            return false;
        }
        if !self.hidden.remove(id) {
            self.hidden.insert(id.to_string());
        }
        true
    }

    pub fn is_visible(&self, id: &str) -> bool {
        !self.hidden.contains(id)
    }

    pub fn hidden_ids(&self) -> impl Iterator<Item = &str> {
        self.hidden.iter().map(String::as_str)
    }

    /// Verify arena bookkeeping: every node reachable exactly once, parent
    /// references match, UI state points at live blocks
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        let mut stack: Vec<(&BlockId, Option<ParentRef>)> =
            self.forest.root.iter().map(|id| (id, None)).collect();

        while let Some((id, expected_parent)) = stack.pop() {
            let Some(node) = self.forest.nodes.get(id) else {
                return false;
            };
            if !seen.insert(id.as_str()) || node.parent != expected_parent {
                return false;
            }
            for (slot, children) in &node.slots {
                for child in children {
                    let parent = ParentRef {
                        block_id: id.clone(),
                        slot: slot.clone(),
                    };
                    stack.push((child, Some(parent)));
                }
            }
        }

        let selection_ok = self
            .selected
            .as_ref()
            .map_or(true, |id| self.forest.contains(id));
        let hidden_ok = self.hidden.iter().all(|id| self.forest.contains(id));

        seen.len() == self.forest.nodes.len() && selection_ok && hidden_ok
    }

    // ---- arena internals ----

    fn list(&self, parent: Option<&ParentRef>) -> &[BlockId] {
        match parent {
            None => &self.forest.root,
            Some(parent) => self
                .forest
                .nodes
                .get(&parent.block_id)
                .and_then(|node| node.slots.get(&parent.slot))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    fn list_mut(&mut self, parent: Option<&ParentRef>) -> Option<&mut Vec<BlockId>> {
        match parent {
            None => Some(&mut self.forest.root),
            Some(parent) => self
                .forest
                .nodes
                .get_mut(&parent.block_id)
                .map(|node| node.slots.entry(parent.slot.clone()).or_default()),
        }
    }

    fn check_depth(&self, parent: Option<&ParentRef>, block: &Block) -> Result<(), MutationError> {
        let Some(max) = self.max_depth else {
            return Ok(());
        };
        let base = match parent {
            None => 0,
            Some(parent) => self.depth(&parent.block_id).map_or(0, |d| d + 1),
        };
        let depth = base + block.height();
        if depth > max {
            return Err(MutationError::NestingTooDeep { depth, max });
        }
        Ok(())
    }

    fn claim_id(&mut self, requested: &str, policy: IdPolicy) -> BlockId {
        if policy == IdPolicy::Keep
            && !requested.is_empty()
            && !self.forest.nodes.contains_key(requested)
        {
            return requested.to_string();
        }
        loop {
            let id = self.ids.new_id();
            if !self.forest.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    /// Add a subtree to the arena without linking its root into any list
    fn insert_tree(&mut self, block: Block, parent: Option<ParentRef>, policy: IdPolicy) -> BlockId {
        let id = self.claim_id(&block.id, policy);

        let mut values = BTreeMap::new();
        let mut nested = Vec::new();
        for (key, value) in block.props {
            match value {
                PropValue::Blocks(children) => nested.push((key, children)),
                other => {
                    values.insert(key, other);
                }
            }
        }

        // Reserve the id before descending so children cannot claim it
        self.forest.nodes.insert(
            id.clone(),
            Node {
                block_type: block.block_type,
                values,
                slots: BTreeMap::new(),
                parent,
            },
        );

        let mut slots = BTreeMap::new();
        for (slot, children) in nested {
            let child_parent = ParentRef {
                block_id: id.clone(),
                slot: slot.clone(),
            };
            let child_ids: Vec<BlockId> = children
                .into_iter()
                .map(|child| self.insert_tree(child, Some(child_parent.clone()), policy))
                .collect();
            slots.insert(slot, child_ids);
        }
        if let Some(node) = self.forest.nodes.get_mut(&id) {
            node.slots = slots;
        }

        id
    }

    /// Unlink a block from its containing list
    fn detach(&mut self, id: &str) -> Option<Location> {
        let parent = self.forest.nodes.get(id)?.parent.clone();
        let list = self.list_mut(parent.as_ref())?;
        let index = list.iter().position(|x| x == id)?;
        list.remove(index);
        Some(Location { parent, index })
    }

    /// Drop a subtree from the arena
    fn remove_tree(&mut self, id: &str, removed: &mut Vec<BlockId>) {
        if let Some(node) = self.forest.nodes.remove(id) {
            removed.push(id.to_string());
            for children in node.slots.into_values() {
                for child in children {
                    self.remove_tree(&child, removed);
                }
            }
        }
    }

    fn prune_ui_state(&mut self) {
        let nodes = &self.forest.nodes;
        if self.selected.as_ref().is_some_and(|id| !nodes.contains_key(id)) {
            self.selected = None;
        }
        self.hidden.retain(|id| nodes.contains_key(id));
    }
}

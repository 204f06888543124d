//! Block identity: id generation and subtree cloning.

use crate::block::{Block, PropValue};
use crc32fast::Hasher;

/// Derive a short id seed from an arbitrary session key using CRC32
pub fn get_seed(key: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for blocks within a session
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(key: &str) -> Self {
        Self {
            seed: get_seed(key),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

/// Deep copy with every id cleared, so the copy shares no identifiers
/// with the document it came from
pub fn strip_ids(block: &Block) -> Block {
    let mut copy = block.clone();
    clear_ids(&mut copy);
    copy
}

fn clear_ids(block: &mut Block) {
    block.id.clear();
    for value in block.props.values_mut() {
        if let PropValue::Blocks(children) = value {
            children.iter_mut().for_each(clear_ids);
        }
    }
}

/// Rewrite every id in the subtree with one produced by `next_id`
pub fn assign_ids(block: &mut Block, next_id: &mut impl FnMut() -> String) {
    block.id = next_id();
    for value in block.props.values_mut() {
        if let PropValue::Blocks(children) = value {
            for child in children {
                assign_ids(child, next_id);
            }
        }
    }
}

/// Deep copy with fresh ids throughout
pub fn clone_with_fresh_ids(block: &Block, ids: &mut IdGenerator) -> Block {
    let mut copy = block.clone();
    assign_ids(&mut copy, &mut || ids.new_id());
    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Block {
        Block::new("row")
            .with_id("r")
            .with_prop("left", vec![Block::new("text").with_id("t1")])
            .with_prop("right", vec![Block::new("image").with_id("i1")])
    }

    #[test]
    fn test_seed_is_stable() {
        assert_eq!(get_seed("session-a"), get_seed("session-a"));
        assert_ne!(get_seed("session-a"), get_seed("session-b"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::from_seed("abc");
        assert_eq!(gen.new_id(), "abc-1");
        assert_eq!(gen.new_id(), "abc-2");
        assert_eq!(gen.seed(), "abc");
    }

    #[test]
    fn test_strip_ids_clears_nested() {
        let stripped = strip_ids(&row());
        assert!(stripped.ids().iter().all(|id| id.is_empty()));
        assert_eq!(stripped.count(), 3);
    }

    #[test]
    fn test_clone_with_fresh_ids_rewrites_everything() {
        let original = row();
        let mut gen = IdGenerator::from_seed("x");
        let copy = clone_with_fresh_ids(&original, &mut gen);

        let original_ids = original.ids();
        for id in copy.ids() {
            assert!(!original_ids.contains(&id));
        }
        assert!(copy.same_content(&original));
    }
}

//! Preview rendering boundary.
//!
//! Turns the live document into a renderer-ready tree for one viewport:
//! responsive props are resolved, hidden blocks are skipped, and block
//! types the registry does not know become placeholders. The document
//! itself is never touched.

use crate::block::Block;
use crate::document::Document;
use crate::registry::BlockRegistry;
use crate::responsive::Viewport;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PreviewNode {
    #[serde(rename_all = "camelCase")]
    Block {
        id: String,
        block_type: String,
        /// Display name from the registry
        name: String,
        /// Non-slot props resolved for the viewport
        props: BTreeMap<String, Value>,
        slots: BTreeMap<String, Vec<PreviewNode>>,
    },

    /// Block type missing from the registry
    #[serde(rename_all = "camelCase")]
    Placeholder { id: String, block_type: String },
}

impl PreviewNode {
    pub fn id(&self) -> &str {
        match self {
            PreviewNode::Block { id, .. } | PreviewNode::Placeholder { id, .. } => id,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PreviewNode::Placeholder { .. })
    }
}

/// Render settings
#[derive(Debug, Clone, Copy)]
pub struct PreviewOptions {
    pub viewport: Viewport,

    /// Editors show hidden blocks dimmed; published output drops them
    pub include_hidden: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::Desktop,
            include_hidden: false,
        }
    }
}

/// Render the document's top level
pub fn preview(doc: &Document, registry: &BlockRegistry, options: PreviewOptions) -> Vec<PreviewNode> {
    render_list(&doc.blocks(), doc, registry, options)
}

fn render_list(
    blocks: &[Block],
    doc: &Document,
    registry: &BlockRegistry,
    options: PreviewOptions,
) -> Vec<PreviewNode> {
    blocks
        .iter()
        .filter(|block| options.include_hidden || doc.is_visible(&block.id))
        .map(|block| render_block(block, doc, registry, options))
        .collect()
}

fn render_block(
    block: &Block,
    doc: &Document,
    registry: &BlockRegistry,
    options: PreviewOptions,
) -> PreviewNode {
    let Some(definition) = registry.get(&block.block_type) else {
        return PreviewNode::Placeholder {
            id: block.id.clone(),
            block_type: block.block_type.clone(),
        };
    };

    let mut props = BTreeMap::new();
    let mut slots = BTreeMap::new();
    for (key, value) in &block.props {
        match value.as_blocks() {
            Some(children) => {
                slots.insert(key.clone(), render_list(children, doc, registry, options));
            }
            None => {
                props.insert(key.clone(), value.resolve(options.viewport));
            }
        }
    }

    PreviewNode::Block {
        id: block.id.clone(),
        block_type: block.block_type.clone(),
        name: definition.name.clone(),
        props,
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdGenerator;
    use crate::responsive::ResponsiveValue;
    use serde_json::json;

    fn doc() -> Document {
        let gap = ResponsiveValue::new(json!("24px")).with_mobile(json!("8px"));
        Document::from_blocks(
            vec![
                Block::new("row")
                    .with_id("r")
                    .with_prop("gap", gap)
                    .with_prop("left", vec![Block::new("text").with_id("t")]),
                Block::new("carousel").with_id("c"),
            ],
            IdGenerator::from_seed("p"),
        )
        .unwrap()
    }

    #[test]
    fn test_resolves_props_for_viewport() {
        let doc = doc();
        let registry = BlockRegistry::builtin();
        let options = PreviewOptions {
            viewport: Viewport::Mobile,
            ..Default::default()
        };

        let nodes = preview(&doc, &registry, options);
        let PreviewNode::Block { props, slots, name, .. } = &nodes[0] else {
            panic!("expected block");
        };
        assert_eq!(name, "Row");
        assert_eq!(props["gap"], json!("8px"));
        assert_eq!(slots["left"][0].id(), "t");
    }

    #[test]
    fn test_unknown_type_is_placeholder() {
        let doc = doc();
        let nodes = preview(&doc, &BlockRegistry::builtin(), PreviewOptions::default());

        assert!(nodes[1].is_placeholder());
        assert!(doc.contains("c"));
    }

    #[test]
    fn test_hidden_blocks_skipped_unless_requested() {
        let mut doc = doc();
        doc.toggle_visibility("t");
        let registry = BlockRegistry::builtin();

        let nodes = preview(&doc, &registry, PreviewOptions::default());
        let PreviewNode::Block { slots, .. } = &nodes[0] else {
            panic!("expected block");
        };
        assert!(slots["left"].is_empty());

        let options = PreviewOptions {
            include_hidden: true,
            ..Default::default()
        };
        let nodes = preview(&doc, &registry, options);
        let PreviewNode::Block { slots, .. } = &nodes[0] else {
            panic!("expected block");
        };
        assert_eq!(slots["left"].len(), 1);
    }

    #[test]
    fn test_serialized_shape() {
        let doc = Document::from_blocks(
            vec![Block::new("ghost").with_id("g")],
            IdGenerator::from_seed("p"),
        )
        .unwrap();
        let nodes = preview(&doc, &BlockRegistry::new(), PreviewOptions::default());
        assert_eq!(
            serde_json::to_value(&nodes).unwrap(),
            json!([{ "kind": "placeholder", "id": "g", "blockType": "ghost" }])
        );
    }
}

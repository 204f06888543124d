//! # Block Model
//!
//! The serialized page format: an ordered JSON array of `{ id, type, props }`,
//! where container blocks carry further block lists inside named props.
//!
//! ```text
//! [
//!   { "id": "a1", "type": "text", "props": { "content": "<p>Hi</p>" } },
//!   { "id": "a2", "type": "row",  "props": { "left": [ { "id": "a3", ... } ] } }
//! ]
//! ```
//!
//! Templates use the same shape without ids.

use crate::responsive::{resolve_json, ResponsiveValue, Viewport};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Block identifier, unique across the whole document forest
pub type BlockId = String;

/// Property map of a block
pub type Props = BTreeMap<String, PropValue>;

/// A typed, identified unit of page content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    /// Empty when not yet assigned (templates, clipboard contents)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: BlockId,

    /// Registry key
    #[serde(rename = "type")]
    pub block_type: String,

    #[serde(default)]
    pub props: Props,
}

/// A single property value
///
/// Parsed JSON is classified by shape (see [`PropValue::from_json`]). The
/// session then corrects the guess against the block registry, which is the
/// authority on which fields hold nested blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    /// Nested ordered block list (container slots)
    Blocks(Vec<Block>),

    /// Per-viewport value
    Responsive(ResponsiveValue<Value>),

    /// Scalars and opaque JSON structures
    Value(Value),
}

impl Block {
    /// Create a block without an id
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            block_type: block_type.into(),
            props: Props::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<BlockId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    /// Nested block lists, keyed by slot name
    pub fn slots(&self) -> impl Iterator<Item = (&String, &Vec<Block>)> {
        self.props.iter().filter_map(|(key, value)| match value {
            PropValue::Blocks(children) => Some((key, children)),
            _ => None,
        })
    }

    /// Visit this block and every nested block, depth first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Block)) {
        visit(self);
        for (_, children) in self.slots() {
            for child in children {
                child.walk(visit);
            }
        }
    }

    /// All ids in this subtree, including empty ones
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.walk(&mut |block| ids.push(block.id.as_str()));
        ids
    }

    /// Number of blocks in this subtree
    pub fn count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Levels of nesting below this block (0 for a leaf)
    pub fn height(&self) -> usize {
        self.slots()
            .flat_map(|(_, children)| children.iter())
            .map(|child| child.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Compare type and props, ignoring ids at every level
    pub fn same_content(&self, other: &Block) -> bool {
        crate::identity::strip_ids(self) == crate::identity::strip_ids(other)
    }

    /// Parse a page from its serialized JSON form
    pub fn list_from_json(json: &str) -> Result<Vec<Block>, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize a page to JSON
    pub fn list_to_json(blocks: &[Block]) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(blocks)
    }
}

impl<'de> Deserialize<'de> for PropValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(PropValue::from_json)
    }
}

/// A non-empty array of serialized blocks, each carrying `id`, `type` and
/// `props` and nothing else
fn is_saved_block_list(value: &Value) -> bool {
    let Some(items) = value.as_array() else {
        return false;
    };
    !items.is_empty()
        && items.iter().all(|item| {
            item.as_object().is_some_and(|object| {
                object.len() == 3
                    && object.get("id").and_then(Value::as_str).is_some_and(|id| !id.is_empty())
                    && object.get("type").is_some_and(Value::is_string)
                    && object.get("props").is_some_and(Value::is_object)
            })
        })
}

impl PropValue {
    /// Classify raw JSON
    ///
    /// Arrays of saved blocks become [`PropValue::Blocks`], objects keyed by
    /// viewport with a `desktop` entry become [`PropValue::Responsive`], and
    /// everything else (including empty lists) stays opaque.
    pub fn from_json(value: Value) -> Self {
        if is_saved_block_list(&value) {
            if let Ok(blocks) = serde_json::from_value(value.clone()) {
                return PropValue::Blocks(blocks);
            }
        }
        if value.get("desktop").is_some() {
            if let Ok(responsive) = serde_json::from_value(value.clone()) {
                return PropValue::Responsive(responsive);
            }
        }
        PropValue::Value(value)
    }

    /// Plain JSON form, as written to the page file
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn is_blocks(&self) -> bool {
        matches!(self, PropValue::Blocks(_))
    }

    pub fn as_blocks(&self) -> Option<&[Block]> {
        match self {
            PropValue::Blocks(blocks) => Some(blocks),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Value(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_responsive(&self) -> Option<&ResponsiveValue<Value>> {
        match self {
            PropValue::Responsive(value) => Some(value),
            _ => None,
        }
    }

    /// Resolve to the JSON value a renderer sees for `viewport`
    ///
    /// Nested block lists are serialized unchanged.
    pub fn resolve(&self, viewport: Viewport) -> Value {
        match self {
            PropValue::Responsive(value) => value.resolve(viewport).clone(),
            PropValue::Value(value) => resolve_json(value, viewport).clone(),
            PropValue::Blocks(_) => self.to_json(),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Value(Value::String(value.to_string()))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Value(Value::String(value))
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Value(Value::Bool(value))
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Value(Value::from(value))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Value(Value::from(value))
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        PropValue::Value(value)
    }
}

impl From<Vec<Block>> for PropValue {
    fn from(blocks: Vec<Block>) -> Self {
        PropValue::Blocks(blocks)
    }
}

impl From<ResponsiveValue<Value>> for PropValue {
    fn from(value: ResponsiveValue<Value>) -> Self {
        PropValue::Responsive(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_page_with_nested_blocks() {
        let json = r#"[
            { "id": "a", "type": "text", "props": { "content": "<p>A</p>", "alignment": "left" } },
            { "id": "b", "type": "row", "props": {
                "left": [ { "id": "c", "type": "button", "props": { "text": "Go" } } ],
                "gap": { "desktop": "24px", "mobile": "8px" }
            } }
        ]"#;

        let blocks = Block::list_from_json(json).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].prop("content").and_then(|p| p.as_str()), Some("<p>A</p>"));

        let row = &blocks[1];
        let left = row.prop("left").and_then(|p| p.as_blocks()).unwrap();
        assert_eq!(left[0].id, "c");
        assert!(row.prop("gap").unwrap().as_responsive().is_some());
        assert_eq!(row.count(), 2);
        assert_eq!(row.height(), 1);
    }

    #[test]
    fn test_opaque_json_props_survive() {
        let json = r#"[{ "id": "p", "type": "pricing", "props": {
            "plans": [ { "name": "Basic", "price": 9 } ],
            "tags": ["a", "b"],
            "style": { "color": "red" }
        } }]"#;

        let blocks = Block::list_from_json(json).unwrap();
        let props = &blocks[0].props;
        assert_eq!(props["plans"], PropValue::Value(json!([{ "name": "Basic", "price": 9 }])));
        assert_eq!(props["tags"], PropValue::Value(json!(["a", "b"])));
        assert_eq!(props["style"], PropValue::Value(json!({ "color": "red" })));
    }

    #[test]
    fn test_list_props_roundtrip_unchanged() {
        let json = json!([{ "id": "p", "type": "pricing", "props": {
            "tags": ["a", "b"],
            "plans": [ { "name": "Basic" } ],
            "empty": [],
            "fields": [ { "type": "email" } ]
        } }]);

        let blocks: Vec<Block> = serde_json::from_value(json.clone()).unwrap();
        assert!(blocks[0].slots().next().is_none());
        assert_eq!(serde_json::to_value(&blocks).unwrap(), json);
    }

    #[test]
    fn test_classify_prop_shapes() {
        let saved = json!([{ "id": "c", "type": "text", "props": {} }]);
        assert!(PropValue::from_json(saved).is_blocks());

        let responsive = PropValue::from_json(json!({ "desktop": "3", "mobile": "1" }));
        assert!(responsive.as_responsive().is_some());

        let extra_key = json!({ "desktop": "3", "color": "red" });
        assert_eq!(PropValue::from_json(extra_key.clone()), PropValue::Value(extra_key));

        let no_id = json!([{ "type": "email", "props": {} }]);
        assert_eq!(PropValue::from_json(no_id.clone()), PropValue::Value(no_id));
    }

    #[test]
    fn test_template_without_ids_serializes_without_ids() {
        let template = Block::new("text").with_prop("content", "hello");
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json, json!({ "type": "text", "props": { "content": "hello" } }));
    }

    #[test]
    fn test_serialized_shape_roundtrips() {
        let json = json!([
            { "id": "r", "type": "row", "props": {
                "center": [ { "id": "t", "type": "text", "props": { "content": "x" } } ]
            } }
        ]);
        let blocks: Vec<Block> = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(serde_json::to_value(&blocks).unwrap(), json);
    }

    #[test]
    fn test_same_content_ignores_ids() {
        let a = Block::new("row")
            .with_id("1")
            .with_prop("left", vec![Block::new("text").with_id("2")]);
        let b = Block::new("row")
            .with_id("9")
            .with_prop("left", vec![Block::new("text").with_id("8")]);
        assert!(a.same_content(&b));
        assert_ne!(a, b);
    }
}

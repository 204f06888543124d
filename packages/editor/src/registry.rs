//! # Block Registry
//!
//! Static table of block types: display name, category, settings schema and
//! default props. The editor consults it when instantiating brand-new blocks
//! (add, templates) and when building previews; unknown types are never an
//! error, they render as placeholders.
//!
//! The schema also decides which props hold nested blocks. Only fields of
//! kind `blocks` are slots; a list anywhere else is opaque data, whatever it
//! looks like.
//!
//! Definitions load from JSON:
//!
//! ```text
//! {
//!   "quote": {
//!     "name": "Quote",
//!     "category": "content",
//!     "schema": [ { "name": "text", "label": "Text", "kind": "textarea" } ],
//!     "defaultProps": { "text": "..." }
//!   }
//! }
//! ```

use crate::block::{Block, PropValue, Props};
use crate::responsive::ResponsiveValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Settings-panel field kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Textarea,
    RichText,
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Boolean,
    Color,
    Image,
    Url,
    Select {
        options: Vec<String>,
    },
    /// Nested block list; `exclude` lists types hidden from its picker
    Blocks {
        #[serde(default)]
        exclude: Vec<String>,
    },
}

/// One editable field of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub label: String,

    #[serde(flatten)]
    pub kind: FieldKind,

    /// Field takes a per-viewport value
    #[serde(default)]
    pub responsive: bool,
}

impl FieldSchema {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            responsive: false,
        }
    }

    pub fn responsive(mut self) -> Self {
        self.responsive = true;
        self
    }

    pub fn is_blocks(&self) -> bool {
        matches!(self.kind, FieldKind::Blocks { .. })
    }
}

/// Registry entry for one block type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDefinition {
    pub name: String,
    pub category: String,

    #[serde(default)]
    pub schema: Vec<FieldSchema>,

    #[serde(default)]
    pub default_props: Props,
}

impl BlockDefinition {
    /// True if any field holds nested blocks
    pub fn is_container(&self) -> bool {
        self.schema.iter().any(FieldSchema::is_blocks)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.schema.iter().find(|field| field.name == name)
    }
}

/// Block type lookup table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockRegistry {
    definitions: BTreeMap<String, BlockDefinition>,
}

impl BlockRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard blocks
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (block_type, definition) in builtin_definitions() {
            registry.register(block_type, definition);
        }
        registry
    }

    pub fn register(&mut self, block_type: impl Into<String>, definition: BlockDefinition) {
        self.definitions.insert(block_type.into(), definition);
    }

    /// Add (or override) definitions from a JSON object keyed by type
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let definitions: BTreeMap<String, BlockDefinition> = serde_json::from_str(json)?;
        let count = definitions.len();
        self.definitions.extend(definitions);
        Ok(count)
    }

    pub fn get(&self, block_type: &str) -> Option<&BlockDefinition> {
        self.definitions.get(block_type)
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.definitions.contains_key(block_type)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Types grouped by category
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut categories: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (block_type, definition) in &self.definitions {
            categories
                .entry(definition.category.as_str())
                .or_default()
                .push(block_type.as_str());
        }
        categories
    }

    pub fn is_container(&self, block_type: &str) -> bool {
        self.get(block_type).is_some_and(BlockDefinition::is_container)
    }

    /// `Some(true)` if `block_type` declares `field` as a block list,
    /// `None` for unregistered types
    pub fn declares_slot(&self, block_type: &str, field: &str) -> Option<bool> {
        self.get(block_type)
            .map(|definition| definition.field(field).is_some_and(FieldSchema::is_blocks))
    }

    /// Reconcile a block's props (and its nested blocks) with the schema
    ///
    /// Lists in `blocks` fields become nested blocks, including empty ones.
    /// Block-shaped lists in any other field of a registered type are turned
    /// back into opaque JSON. Unregistered types keep their parsed shape.
    pub fn conform(&self, block: &mut Block) {
        self.conform_props(&block.block_type, &mut block.props);
    }

    /// [`BlockRegistry::conform`] for a partial prop map of `block_type`
    pub fn conform_props(&self, block_type: &str, props: &mut Props) {
        if let Some(definition) = self.get(block_type) {
            for (key, value) in props.iter_mut() {
                let declared = definition.field(key).is_some_and(FieldSchema::is_blocks);
                let replacement = match &*value {
                    PropValue::Blocks(_) if !declared => Some(PropValue::Value(value.to_json())),
                    PropValue::Value(list @ Value::Array(_)) if declared => {
                        serde_json::from_value(list.clone()).ok().map(PropValue::Blocks)
                    }
                    _ => None,
                };
                if let Some(replacement) = replacement {
                    *value = replacement;
                }
            }
        }

        for value in props.values_mut() {
            if let PropValue::Blocks(children) = value {
                for child in children {
                    self.conform(child);
                }
            }
        }
    }

    /// Types offered by the picker of `container_type`'s `slot` field
    ///
    /// Container types are never offered, and neither is anything the
    /// field excludes.
    pub fn nestable_types(&self, container_type: &str, slot: &str) -> Vec<&str> {
        let exclude: &[String] = match self.get(container_type).and_then(|d| d.field(slot)) {
            Some(FieldSchema {
                kind: FieldKind::Blocks { exclude },
                ..
            }) => exclude,
            _ => return Vec::new(),
        };

        self.definitions
            .iter()
            .filter(|(block_type, definition)| {
                !definition.is_container() && !exclude.contains(*block_type)
            })
            .map(|(block_type, _)| block_type.as_str())
            .collect()
    }

    /// Fill props missing from `block` (and its nested blocks) with the
    /// registry defaults
    pub fn apply_defaults(&self, block: &mut Block) {
        if let Some(definition) = self.get(&block.block_type) {
            for (key, value) in &definition.default_props {
                block
                    .props
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        for value in block.props.values_mut() {
            if let PropValue::Blocks(children) = value {
                for child in children {
                    self.apply_defaults(child);
                }
            }
        }
    }

    /// A new block of `block_type` seeded with defaults
    pub fn instantiate(&self, block_type: &str) -> Block {
        let mut block = Block::new(block_type);
        self.apply_defaults(&mut block);
        block
    }
}

fn responsive(desktop: &str, tablet: Option<&str>, mobile: Option<&str>) -> PropValue {
    let mut value = ResponsiveValue::new(Value::from(desktop));
    value.tablet = tablet.map(Value::from);
    value.mobile = mobile.map(Value::from);
    PropValue::Responsive(value)
}

fn props(entries: Vec<(&str, PropValue)>) -> Props {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn select(options: &[&str]) -> FieldKind {
    FieldKind::Select {
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

fn builtin_definitions() -> Vec<(&'static str, BlockDefinition)> {
    let alignment = || select(&["left", "center", "right"]);

    vec![
        (
            "text",
            BlockDefinition {
                name: "Text".to_string(),
                category: "content".to_string(),
                schema: vec![
                    FieldSchema::new("content", "Content", FieldKind::RichText),
                    FieldSchema::new("alignment", "Alignment", alignment()),
                ],
                default_props: props(vec![
                    ("content", "<p>Start writing...</p>".into()),
                    ("alignment", "left".into()),
                ]),
            },
        ),
        (
            "heading",
            BlockDefinition {
                name: "Heading".to_string(),
                category: "content".to_string(),
                schema: vec![
                    FieldSchema::new("text", "Text", FieldKind::Text),
                    FieldSchema::new("level", "Level", select(&["h1", "h2", "h3", "h4"])),
                    FieldSchema::new("alignment", "Alignment", alignment()),
                    FieldSchema::new("fontSize", "Font size", FieldKind::Text).responsive(),
                ],
                default_props: props(vec![
                    ("text", "Heading".into()),
                    ("level", "h2".into()),
                    ("alignment", "left".into()),
                    ("fontSize", responsive("48px", Some("36px"), Some("28px"))),
                ]),
            },
        ),
        (
            "hero",
            BlockDefinition {
                name: "Hero".to_string(),
                category: "layout".to_string(),
                schema: vec![
                    FieldSchema::new("title", "Title", FieldKind::Text),
                    FieldSchema::new("subtitle", "Subtitle", FieldKind::Textarea),
                    FieldSchema::new("buttonText", "Button text", FieldKind::Text),
                    FieldSchema::new("buttonUrl", "Button link", FieldKind::Url),
                    FieldSchema::new("backgroundImage", "Background", FieldKind::Image),
                    FieldSchema::new("height", "Height", FieldKind::Text).responsive(),
                ],
                default_props: props(vec![
                    ("title", "Welcome".into()),
                    ("subtitle", "Describe what you do".into()),
                    ("buttonText", "Get started".into()),
                    ("buttonUrl", "#".into()),
                    ("height", responsive("600px", None, Some("400px"))),
                ]),
            },
        ),
        (
            "image",
            BlockDefinition {
                name: "Image".to_string(),
                category: "media".to_string(),
                schema: vec![
                    FieldSchema::new("src", "Image", FieldKind::Image),
                    FieldSchema::new("alt", "Alt text", FieldKind::Text),
                    FieldSchema::new("width", "Width", FieldKind::Text).responsive(),
                ],
                default_props: props(vec![
                    ("src", "".into()),
                    ("alt", "".into()),
                    ("width", responsive("100%", None, None)),
                ]),
            },
        ),
        (
            "button",
            BlockDefinition {
                name: "Button".to_string(),
                category: "content".to_string(),
                schema: vec![
                    FieldSchema::new("text", "Label", FieldKind::Text),
                    FieldSchema::new("url", "Link", FieldKind::Url),
                    FieldSchema::new("variant", "Style", select(&["primary", "secondary", "outline"])),
                    FieldSchema::new("alignment", "Alignment", alignment()),
                ],
                default_props: props(vec![
                    ("text", "Click me".into()),
                    ("url", "#".into()),
                    ("variant", "primary".into()),
                    ("alignment", "left".into()),
                ]),
            },
        ),
        (
            "spacer",
            BlockDefinition {
                name: "Spacer".to_string(),
                category: "layout".to_string(),
                schema: vec![FieldSchema::new("height", "Height", FieldKind::Text).responsive()],
                default_props: props(vec![("height", responsive("64px", Some("48px"), Some("32px")))]),
            },
        ),
        (
            "divider",
            BlockDefinition {
                name: "Divider".to_string(),
                category: "layout".to_string(),
                schema: vec![FieldSchema::new("color", "Color", FieldKind::Color)],
                default_props: props(vec![("color", "#e5e7eb".into())]),
            },
        ),
        (
            "row",
            BlockDefinition {
                name: "Row".to_string(),
                category: "layout".to_string(),
                schema: vec![
                    FieldSchema::new("left", "Left", FieldKind::Blocks { exclude: vec![] }),
                    FieldSchema::new("center", "Center", FieldKind::Blocks { exclude: vec![] }),
                    FieldSchema::new("right", "Right", FieldKind::Blocks { exclude: vec![] }),
                    FieldSchema::new("gap", "Gap", FieldKind::Text).responsive(),
                    FieldSchema::new("stackOnMobile", "Stack on mobile", FieldKind::Boolean),
                ],
                default_props: props(vec![
                    ("left", PropValue::Blocks(vec![])),
                    ("center", PropValue::Blocks(vec![])),
                    ("right", PropValue::Blocks(vec![])),
                    ("gap", responsive("24px", None, Some("12px"))),
                    ("stackOnMobile", true.into()),
                ]),
            },
        ),
    ]
}

//! Core content types for Tessera.
//!
//! These types describe what the CMS hands the kernel (configuration and data
//! entries) and what the kernel hands renderers (resolved node trees).
//! Anything the kernel does not interpret stays an opaque JSON document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Opaque key/value document used for props and shapes.
pub type Props = Map<String, Value>;

/// A configuration entry: layout and shape metadata for a page or component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    /// Entry identifier assigned by the CMS.
    pub id: String,

    /// Editor-facing name (e.g. "Home page config").
    #[serde(default)]
    pub internal_name: String,

    /// Content type tag as stored (e.g. "Page", "Hero").
    #[serde(rename = "type", default)]
    pub type_tag: String,

    /// Template/layout metadata: `template`, `slug`, `title`, nested `content`.
    #[serde(default)]
    pub shape: Props,
}

impl ConfigEntry {
    pub fn new(id: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            internal_name: String::new(),
            type_tag: type_tag.into(),
            shape: Props::new(),
        }
    }

    pub fn internal_name(mut self, name: impl Into<String>) -> Self {
        self.internal_name = name.into();
        self
    }

    /// Set a single shape field.
    pub fn shape_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.shape.insert(key.into(), value.into());
        self
    }

    /// Page template name, if the shape declares one.
    pub fn template(&self) -> Option<&str> {
        self.shape.get("template").and_then(Value::as_str)
    }

    /// Public slug of a page configuration.
    ///
    /// Exported feeds often keep page metadata one level down, under
    /// `shape.data`; the top-level key wins when both are present.
    pub fn slug(&self) -> Option<&str> {
        self.page_field("slug")
    }

    /// Display title of a page configuration. Same lookup as [`Self::slug`].
    pub fn title(&self) -> Option<&str> {
        self.page_field("title")
    }

    fn page_field(&self, key: &str) -> Option<&str> {
        self.shape.get(key).and_then(Value::as_str).or_else(|| {
            self.shape
                .get("data")
                .and_then(|data| data.get(key))
                .and_then(Value::as_str)
        })
    }
}

/// A data entry: content values for the configuration it points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataEntry {
    pub id: String,

    #[serde(default)]
    pub internal_name: String,

    #[serde(rename = "type", default)]
    pub type_tag: String,

    /// Foreign key into the configuration collection. Not enforced by the
    /// store, so it may be missing or dangling.
    #[serde(default)]
    pub config_id: Option<String>,

    /// Stored component blocks, kept raw until resolution so malformed
    /// blocks survive parsing.
    #[serde(default)]
    pub content: Vec<Value>,
}

impl DataEntry {
    pub fn new(id: impl Into<String>, config_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            internal_name: String::new(),
            type_tag: String::new(),
            config_id: Some(config_id.into()),
            content: Vec::new(),
        }
    }

    pub fn type_tag(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = type_tag.into();
        self
    }

    /// Append a stored block.
    pub fn block(mut self, block: Value) -> Self {
        self.content.push(block);
        self
    }
}

/// Result of joining a data entry to its configuration entry.
///
/// Invariant: `data.config_id == Some(config.id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedRecord {
    pub config: ConfigEntry,
    pub data: DataEntry,
}

/// A normalized component block.
///
/// Stored blocks are single-key mappings
/// `{ "<discriminator>": { "props": {...}, "config": {...} } }`;
/// this is the explicit form of the same information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBlock {
    pub discriminator: String,
    pub props: Props,
    pub config: Option<Props>,
}

impl ComponentBlock {
    pub fn new(discriminator: impl Into<String>, props: Props) -> Self {
        Self {
            discriminator: discriminator.into(),
            props,
            config: None,
        }
    }

    pub fn with_config(mut self, config: Props) -> Self {
        self.config = Some(config);
        self
    }

    /// Normalize a stored block.
    ///
    /// The stored value must be an object with exactly one key whose value is
    /// itself an object. `props` and `config` inside that value are optional;
    /// if present they must be objects.
    pub fn from_stored(value: &Value) -> Result<Self, MalformedBlock> {
        let Some(outer) = value.as_object() else {
            return Err(MalformedBlock::NotAnObject);
        };

        let mut entries = outer.iter();
        let (key, body) = match (entries.next(), entries.next()) {
            (None, _) => return Err(MalformedBlock::NoKeys),
            (Some(first), None) => first,
            (Some(_), Some(_)) => {
                return Err(MalformedBlock::MultipleKeys(outer.keys().cloned().collect()));
            }
        };

        let Some(body) = body.as_object() else {
            return Err(MalformedBlock::InvalidBody(key.clone()));
        };

        let props = match body.get("props") {
            None | Some(Value::Null) => Props::new(),
            Some(Value::Object(p)) => p.clone(),
            Some(_) => return Err(MalformedBlock::InvalidBody(key.clone())),
        };

        let config = match body.get("config") {
            None | Some(Value::Null) => None,
            Some(Value::Object(c)) => Some(c.clone()),
            Some(_) => return Err(MalformedBlock::InvalidBody(key.clone())),
        };

        Ok(Self {
            discriminator: key.clone(),
            props,
            config,
        })
    }

    /// Convert back to the stored single-key shape.
    pub fn to_stored(&self) -> Value {
        let mut body = Props::new();
        body.insert("props".into(), Value::Object(self.props.clone()));
        if let Some(config) = &self.config {
            body.insert("config".into(), Value::Object(config.clone()));
        }
        let mut outer = Props::new();
        outer.insert(self.discriminator.clone(), Value::Object(body));
        Value::Object(outer)
    }
}

/// Why a stored block could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum MalformedBlock {
    /// The stored block is not a JSON object.
    #[error("block is not an object")]
    NotAnObject,
    /// The stored block is an empty object.
    #[error("block has no discriminator key")]
    NoKeys,
    /// The stored block has more than one top-level key.
    #[error("block has {} discriminator keys: {}", .0.len(), .0.join(", "))]
    MultipleKeys(Vec<String>),
    /// The value under the discriminator (or its `props`/`config`) is not an object.
    #[error("block '{0}' has a non-object body")]
    InvalidBody(String),
}

/// Whether a resolved node is a page (has a template) or a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Page,
    Component,
}

/// Recovery marker on a terminal node that could not be resolved normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "fault")]
pub enum NodeFault {
    /// The stored block violated the single-key encoding.
    MalformedBlock { problem: MalformedBlock },
    /// Nesting went deeper than the resolver's limit.
    RecursionLimit { depth: usize },
    /// A nested block referenced a configuration entry that does not exist.
    MissingReference { config_id: String },
    /// A nested block referenced a configuration already being expanded
    /// on the path from the root.
    Cycle { config_id: String },
    /// The tree already holds as many nodes as the resolver allows.
    NodeLimit { limit: usize },
}

/// The canonical tree consumed by rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNode {
    pub kind: NodeKind,
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub children: Vec<ResolvedNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<NodeFault>,
}

impl ResolvedNode {
    /// Type tag given to terminal nodes produced by a recovery policy.
    pub const UNKNOWN_TYPE: &'static str = "unknown";

    pub fn component(type_tag: impl Into<String>, props: Props) -> Self {
        Self {
            kind: NodeKind::Component,
            type_tag: type_tag.into(),
            template: None,
            props,
            children: Vec::new(),
            fault: None,
        }
    }

    pub fn page(type_tag: impl Into<String>, template: impl Into<String>, props: Props) -> Self {
        Self {
            kind: NodeKind::Page,
            type_tag: type_tag.into(),
            template: Some(template.into()),
            props,
            children: Vec::new(),
            fault: None,
        }
    }

    /// A terminal node standing in for content that could not be resolved.
    pub fn faulted(fault: NodeFault) -> Self {
        Self {
            kind: NodeKind::Component,
            type_tag: Self::UNKNOWN_TYPE.into(),
            template: None,
            props: Props::new(),
            children: Vec::new(),
            fault: Some(fault),
        }
    }

    pub fn is_page(&self) -> bool {
        self.kind == NodeKind::Page
    }

    /// Number of levels in this tree, counting the node itself.
    pub fn height(&self) -> usize {
        1 + self.children.iter().map(Self::height).max().unwrap_or(0)
    }

    /// Total number of nodes in this tree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// A raw entry as listed by the CMS: an id plus untyped fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub id: String,
    #[serde(default)]
    pub fields: Props,
}

impl RawEntry {
    pub fn new(id: impl Into<String>, fields: Props) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Read an entry in either the flat `{ id, fields }` form or the
    /// delivery API form `{ sys: { id }, fields }`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .or_else(|| value.get("sys").and_then(|s| s.get("id")).and_then(Value::as_str))?;
        let fields = value
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Some(Self::new(id, fields))
    }

    /// Get a string field.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

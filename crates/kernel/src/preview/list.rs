//! The editable preview list.
//!
//! An ordered, owned buffer of preview items plus a two-state edit machine
//! (`Idle` / `Editing`). Every operation is synchronous, takes `&mut self`
//! and cannot fail: ids or indices that do not match anything are no-ops,
//! since UI events routinely race with deletes and template switches.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use tessera_sdk::types::{ComponentBlock, Props, ResolvedNode};

/// Props consulted, in order, for an item's editable text.
const CONTENT_PROPS: [&str; 3] = ["title", "content", "text"];

/// Prop the edited text is written to when the item did not come from one.
const DEFAULT_CONTENT_PROP: &str = "content";

/// One component in the preview list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub content: String,
    #[serde(default)]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Props>,
    /// Prop the text was read from, and is written back to.
    #[serde(default, rename = "contentKey", skip_serializing_if = "Option::is_none")]
    pub content_key: Option<String>,
}

impl PreviewItem {
    pub fn new(id: impl Into<String>, item_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
            content: content.into(),
            editable: true,
            properties: None,
            content_key: None,
        }
    }

    /// Mark the item read-only.
    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn with_properties(mut self, properties: Props) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Convert to the stored block shape.
    ///
    /// The edited text is written back under the prop it was read from
    /// (`content` for items created in the editor), alongside any component
    /// properties.
    pub fn to_block(&self) -> ComponentBlock {
        let mut props = self.properties.clone().unwrap_or_default();
        let key = self.content_key.as_deref().unwrap_or(DEFAULT_CONTENT_PROP);
        props.insert(key.into(), Value::String(self.content.clone()));
        ComponentBlock::new(self.item_type.clone(), props)
    }
}

/// Where an inserted component comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentSource {
    /// A brand new component.
    New,
    /// A reference to an existing CMS entry.
    Existing,
}

/// An item to insert; the list assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub item_type: String,
    pub content: String,
    pub properties: Option<Props>,
}

impl NewItem {
    pub fn new(item_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            content: content.into(),
            properties: None,
        }
    }

    /// Placeholder content for a component picked from the palette.
    pub fn placeholder(item_type: &str, source: ComponentSource) -> Self {
        let content = match source {
            ComponentSource::New => format!("New {item_type} component"),
            ComponentSource::Existing => format!("Existing {item_type} entry"),
        };
        Self::new(item_type, content)
    }

    pub fn with_properties(mut self, properties: Props) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Edit state of the list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    /// No pending edit.
    #[default]
    Idle,
    /// One item's content is being composed before commit.
    Editing { item_id: String, draft: String },
}

/// Ordered, editable list of preview items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewList {
    record_id: Option<String>,
    items: Vec<PreviewItem>,
    state: EditState,
}

impl PreviewList {
    /// Create an empty list not tied to any record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list showing a record's components.
    pub fn for_record(record_id: impl Into<String>, items: Vec<PreviewItem>) -> Self {
        Self {
            record_id: Some(record_id.into()),
            items,
            state: EditState::Idle,
        }
    }

    /// Seed a list from a resolved tree's direct children.
    ///
    /// Item ids are assigned fresh. Text comes from the first string prop
    /// among `title`, `content` and `text`; the remaining props are kept as
    /// properties and the text prop is remembered so edits land back on it.
    pub fn from_resolved(record_id: impl Into<String>, node: &ResolvedNode) -> Self {
        let items = node
            .children
            .iter()
            .map(|child| {
                let found = CONTENT_PROPS.iter().find_map(|key| {
                    child
                        .props
                        .get(*key)
                        .and_then(Value::as_str)
                        .map(|text| (*key, text))
                });
                let content = found.map(|(_, text)| text).unwrap_or_default();
                let mut item = PreviewItem::new(fresh_id(), child.type_tag.clone(), content);
                item.content_key = found.map(|(key, _)| key.to_string());
                if !child.props.is_empty() {
                    item.properties = Some(child.props.clone());
                }
                item
            })
            .collect();
        Self::for_record(record_id, items)
    }

    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    /// Items in render order.
    pub fn items(&self) -> &[PreviewItem] {
        &self.items
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PreviewItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Id of the item being edited, if any.
    pub fn editing(&self) -> Option<&str> {
        match &self.state {
            EditState::Idle => None,
            EditState::Editing { item_id, .. } => Some(item_id),
        }
    }

    /// Replace the whole list with another record's components.
    ///
    /// Any in-flight edit is discarded; nothing carries over between records.
    pub fn reset(&mut self, record_id: impl Into<String>, items: Vec<PreviewItem>) {
        let record_id = record_id.into();
        debug!(record_id = %record_id, items = items.len(), "preview list reset");
        self.record_id = Some(record_id);
        self.items = items;
        self.state = EditState::Idle;
    }

    /// Relocate the item at `from` to `to`.
    ///
    /// Items between the two positions shift by one. Out-of-range indices
    /// and `from == to` are no-ops.
    pub fn move_item(&mut self, from: usize, to: usize) {
        let len = self.items.len();
        if from == to || from >= len || to >= len {
            return;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
    }

    /// Replace an item's content. Last write wins.
    ///
    /// If that item is being edited the edit is closed; an edit of a
    /// different item is left alone.
    pub fn update(&mut self, id: &str, content: impl Into<String>) {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return;
        };
        item.content = content.into();
        if self.editing() == Some(id) {
            self.state = EditState::Idle;
        }
    }

    /// Remove an item, discarding its in-flight edit if it had one.
    pub fn delete(&mut self, id: &str) {
        let Some(index) = self.position(id) else {
            return;
        };
        self.items.remove(index);
        if self.editing() == Some(id) {
            self.state = EditState::Idle;
        }
    }

    /// Append a new editable item and return its generated id.
    pub fn insert(&mut self, new: NewItem) -> String {
        let id = fresh_id();
        self.items.push(PreviewItem {
            id: id.clone(),
            item_type: new.item_type,
            content: new.content,
            editable: true,
            properties: new.properties,
            content_key: None,
        });
        id
    }

    /// Start editing an item, seeding the draft with its current content.
    ///
    /// Read-only and unknown items are ignored. Starting an edit replaces
    /// any other in-flight edit. Returns whether the list is now editing `id`.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(item) = self.get(id).filter(|item| item.editable) else {
            return false;
        };
        self.state = EditState::Editing {
            item_id: item.id.clone(),
            draft: item.content.clone(),
        };
        true
    }

    /// Replace the draft text of the in-flight edit.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let EditState::Editing { draft, .. } = &mut self.state {
            *draft = text.into();
        }
    }

    /// Commit the in-flight edit through [`update`](Self::update).
    pub fn commit_edit(&mut self) {
        if let EditState::Editing { item_id, draft } = std::mem::take(&mut self.state) {
            self.update(&item_id, draft);
        }
    }

    /// Abandon the in-flight edit, leaving content unchanged.
    pub fn cancel_edit(&mut self) {
        self.state = EditState::Idle;
    }

    /// Stored block shapes for every item, in order.
    pub fn to_blocks(&self) -> Vec<Value> {
        self.items
            .iter()
            .map(|item| item.to_block().to_stored())
            .collect()
    }
}

fn fresh_id() -> String {
    Uuid::now_v7().to_string()
}

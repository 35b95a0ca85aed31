//! Entry store abstraction.
//!
//! A store lists the raw entries of a content type. It is the only place the
//! kernel waits on I/O; everything downstream works on parsed entries.

mod dir;
mod memory;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use tessera_sdk::types::{ConfigEntry, DataEntry, Props, RawEntry};

use crate::error::{EntryParseError, StoreError};

pub use dir::DirEntryStore;
pub use memory::MemoryEntryStore;

/// Source of raw CMS entries.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// List every entry of a content type, in store order.
    async fn fetch_entries_by_type(&self, content_type: &str) -> Result<Vec<RawEntry>, StoreError>;
}

/// Parse a raw entry as a configuration entry.
///
/// `shape` may also be stored under `data`. Missing fields take defaults; a
/// field of the wrong JSON type makes the entry unparseable.
pub fn parse_config_entry(raw: &RawEntry) -> Result<ConfigEntry, EntryParseError> {
    let shape = match raw.fields.get("shape").or_else(|| raw.fields.get("data")) {
        None | Some(Value::Null) => Props::new(),
        Some(Value::Object(shape)) => shape.clone(),
        Some(_) => return Err(wrong_type("shape", "an object")),
    };

    Ok(ConfigEntry {
        id: raw.id.clone(),
        internal_name: string_field(raw, "internalName")?,
        type_tag: string_field(raw, "type")?,
        shape,
    })
}

/// Parse a raw entry as a data entry.
///
/// `content` may also be stored under `data`. Blocks are kept raw; malformed
/// blocks are dealt with at resolution time.
pub fn parse_data_entry(raw: &RawEntry) -> Result<DataEntry, EntryParseError> {
    let config_id = match raw.fields.get("configId") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(_) => return Err(wrong_type("configId", "a string")),
    };

    let content = match raw.fields.get("content").or_else(|| raw.fields.get("data")) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(blocks)) => blocks.clone(),
        Some(_) => return Err(wrong_type("content", "an array")),
    };

    Ok(DataEntry {
        id: raw.id.clone(),
        internal_name: string_field(raw, "internalName")?,
        type_tag: string_field(raw, "type")?,
        config_id,
        content,
    })
}

/// Parse every config entry, skipping (and logging) unparseable ones.
pub fn parse_config_entries(raw: &[RawEntry]) -> Vec<ConfigEntry> {
    parse_all(raw, "config", parse_config_entry)
}

/// Parse every data entry, skipping (and logging) unparseable ones.
pub fn parse_data_entries(raw: &[RawEntry]) -> Vec<DataEntry> {
    parse_all(raw, "data", parse_data_entry)
}

fn parse_all<T>(
    raw: &[RawEntry],
    kind: &'static str,
    parse: fn(&RawEntry) -> Result<T, EntryParseError>,
) -> Vec<T> {
    raw.iter()
        .filter_map(|entry| match parse(entry) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(entry_id = %entry.id, kind, error = %e, "skipping unparseable entry");
                None
            }
        })
        .collect()
}

fn string_field(raw: &RawEntry, name: &'static str) -> Result<String, EntryParseError> {
    match raw.fields.get(name) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(wrong_type(name, "a string")),
    }
}

fn wrong_type(field: &'static str, expected: &'static str) -> EntryParseError {
    EntryParseError::WrongType { field, expected }
}

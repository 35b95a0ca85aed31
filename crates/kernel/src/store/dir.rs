//! Directory-backed entry store.
//!
//! Reads exported entries from `<dir>/<content_type>.json`, `.yaml` or
//! `.yml`. A file holds either a bare array of entries or a delivery-style
//! `{ "items": [...] }` object. Each entry is `{ id, fields }` or
//! `{ sys: { id }, fields }`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use tessera_sdk::types::RawEntry;

use super::EntryStore;
use crate::error::StoreError;

/// Extensions tried, in order, for each content type.
const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Entry store reading exported files from a directory.
#[derive(Debug, Clone)]
pub struct DirEntryStore {
    root: PathBuf,
}

impl DirEntryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// First existing export file for a content type.
    async fn locate(&self, content_type: &str) -> Option<PathBuf> {
        for ext in EXTENSIONS {
            let path = self.root.join(format!("{content_type}.{ext}"));
            if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
                return Some(path);
            }
        }
        None
    }
}

/// Content types name files, so they must be a single plain path segment.
fn is_safe_content_type(content_type: &str) -> bool {
    !content_type.is_empty()
        && !content_type.starts_with('.')
        && content_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn parse_document(path: &Path, text: &str) -> Result<Value, StoreError> {
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    if is_json {
        serde_json::from_str(text).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_yml::from_str(text).map_err(|source| StoreError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn collect_entries(path: &Path, document: Value) -> Result<Vec<RawEntry>, StoreError> {
    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(StoreError::UnexpectedLayout {
                    path: path.to_path_buf(),
                });
            }
        },
        Value::Null => Vec::new(),
        _ => {
            return Err(StoreError::UnexpectedLayout {
                path: path.to_path_buf(),
            });
        }
    };

    Ok(items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let entry = RawEntry::from_value(item);
            if entry.is_none() {
                warn!(path = %path.display(), index, "skipping entry without an id");
            }
            entry
        })
        .collect())
}

#[async_trait]
impl EntryStore for DirEntryStore {
    async fn fetch_entries_by_type(&self, content_type: &str) -> Result<Vec<RawEntry>, StoreError> {
        if !is_safe_content_type(content_type) {
            return Err(StoreError::UnknownContentType(content_type.to_string()));
        }

        let path = self
            .locate(content_type)
            .await
            .ok_or_else(|| StoreError::UnknownContentType(content_type.to_string()))?;

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        let entries = collect_entries(&path, parse_document(&path, &text)?)?;
        debug!(path = %path.display(), count = entries.len(), "loaded entries");
        Ok(entries)
    }
}

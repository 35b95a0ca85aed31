//! In-memory entry store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use tessera_sdk::types::RawEntry;

use super::EntryStore;
use crate::error::StoreError;

/// Entries held in memory, keyed by content type.
///
/// Listing an unknown content type yields an empty list.
#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    entries: RwLock<HashMap<String, Vec<RawEntry>>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_entry(self, content_type: &str, entry: RawEntry) -> Self {
        self.insert(content_type, entry);
        self
    }

    /// Append an entry to a content type.
    pub fn insert(&self, content_type: &str, entry: RawEntry) {
        self.entries
            .write()
            .entry(content_type.to_string())
            .or_default()
            .push(entry);
    }

    /// Replace every entry of a content type.
    pub fn replace(&self, content_type: &str, entries: Vec<RawEntry>) {
        self.entries.write().insert(content_type.to_string(), entries);
    }

    /// Number of entries of a content type.
    pub fn count(&self, content_type: &str) -> usize {
        self.entries.read().get(content_type).map_or(0, Vec::len)
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn fetch_entries_by_type(&self, content_type: &str) -> Result<Vec<RawEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .get(content_type)
            .cloned()
            .unwrap_or_default())
    }
}

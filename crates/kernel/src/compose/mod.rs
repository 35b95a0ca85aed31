//! Page composition over an entry store.
//!
//! The composer fetches the configuration and data collections concurrently,
//! links them, and runs the resolver and dispatcher on the result. Fetched
//! collections are cached by content type. A failed fetch is logged and
//! treated as an empty collection ("not yet available"); it is not cached,
//! so the next call retries.

use std::sync::Arc;

use tracing::{debug, warn};

use tessera_sdk::render::RenderInstruction;
use tessera_sdk::types::{ConfigEntry, LinkedRecord, RawEntry, ResolvedNode};

use crate::cache::ContentCache;
use crate::config::Config;
use crate::error::{ContentError, ContentResult};
use crate::content::{Dispatcher, Resolver, canonicalize, link_with_report};
use crate::store::{EntryStore, parse_config_entries, parse_data_entries};

/// Config `type` that marks a routable page.
const PAGE_TYPE: &str = "page";

/// A linked, parsed snapshot of both collections.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Every parsed configuration entry, linked or not.
    pub configs: Vec<ConfigEntry>,
    /// Linked records in data order.
    pub records: Vec<LinkedRecord>,
}

/// Composes pages from a store.
pub struct Composer {
    store: Arc<dyn EntryStore>,
    cache: ContentCache<Vec<RawEntry>>,
    config_type: String,
    data_type: String,
    max_depth: usize,
    max_nodes: usize,
    dispatcher: Dispatcher,
}

impl Composer {
    /// Create a composer with default content types and cache settings.
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self::from_config(store, &Config::default())
    }

    /// Create a composer from loaded configuration.
    pub fn from_config(store: Arc<dyn EntryStore>, config: &Config) -> Self {
        Self {
            store,
            cache: ContentCache::new(config.cache_max_age),
            config_type: config.config_type.clone(),
            data_type: config.data_type.clone(),
            max_depth: config.max_depth,
            max_nodes: config.max_nodes,
            dispatcher: Dispatcher::with_standard_variants(),
        }
    }

    /// Use a specific cache (e.g. one on a manual clock).
    pub fn with_cache(mut self, cache: ContentCache<Vec<RawEntry>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// List one collection, from cache when fresh.
    async fn fetch(&self, content_type: &str) -> Arc<Vec<RawEntry>> {
        if let Some(entries) = self.cache.get(content_type) {
            debug!(content_type = %content_type, "collection cache hit");
            return entries;
        }

        match self.store.fetch_entries_by_type(content_type).await {
            Ok(entries) => self.cache.insert(content_type, entries),
            Err(e) => {
                warn!(content_type = %content_type, error = %e, "fetch failed, treating collection as empty");
                Arc::new(Vec::new())
            }
        }
    }

    /// Fetch, parse and link both collections.
    pub async fn snapshot(&self) -> Snapshot {
        let (raw_configs, raw_datas) =
            tokio::join!(self.fetch(&self.config_type), self.fetch(&self.data_type));

        let configs = parse_config_entries(&raw_configs);
        let datas = parse_data_entries(&raw_datas);
        let (records, report) = link_with_report(&configs, &datas);

        if !report.is_clean() {
            debug!(
                orphaned = report.orphaned.len(),
                shared = report.shared_configs.len(),
                duplicates = report.duplicate_configs.len(),
                "link report"
            );
        }

        Snapshot { configs, records }
    }

    /// Linked records in data order.
    pub async fn linked_records(&self) -> Vec<LinkedRecord> {
        self.snapshot().await.records
    }

    /// Linked records that are routable pages: config type `page` and a
    /// string slug.
    pub async fn pages(&self) -> Vec<LinkedRecord> {
        self.linked_records()
            .await
            .into_iter()
            .filter(is_page)
            .collect()
    }

    /// Resolve and dispatch the page with the given slug.
    pub async fn page_by_slug(&self, slug: &str) -> Option<RenderInstruction> {
        let snapshot = self.snapshot().await;
        let record = snapshot
            .records
            .iter()
            .filter(|record| is_page(record))
            .find(|record| record.config.slug() == Some(slug))?;
        let node = self.resolver(&snapshot.configs).resolve(record);
        Some(self.dispatcher.dispatch(&node))
    }

    /// Like [`Self::page_by_slug`], but a missing page is an error.
    pub async fn render_page(&self, slug: &str) -> ContentResult<RenderInstruction> {
        self.page_by_slug(slug)
            .await
            .ok_or_else(|| ContentError::PageNotFound(slug.to_string()))
    }

    /// Resolve every linked record, in link order.
    pub async fn resolve_all(&self) -> Vec<ResolvedNode> {
        let snapshot = self.snapshot().await;
        let resolver = self.resolver(&snapshot.configs);
        snapshot.records.iter().map(|r| resolver.resolve(r)).collect()
    }

    /// Resolve and dispatch every linked record, in link order.
    pub async fn render_all(&self) -> Vec<RenderInstruction> {
        self.resolve_all()
            .await
            .iter()
            .map(|node| self.dispatcher.dispatch(node))
            .collect()
    }

    /// Drop every cached collection.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    fn resolver(&self, configs: &[ConfigEntry]) -> Resolver {
        Resolver::with_configs(configs)
            .max_depth(self.max_depth)
            .max_nodes(self.max_nodes)
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("config_type", &self.config_type)
            .field("data_type", &self.data_type)
            .field("max_depth", &self.max_depth)
            .field("max_nodes", &self.max_nodes)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn is_page(record: &LinkedRecord) -> bool {
    canonicalize(&record.config.type_tag) == PAGE_TYPE && record.config.slug().is_some()
}

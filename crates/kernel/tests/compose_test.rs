#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Composer tests over in-memory and failing stores.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Duration;
use serde_json::json;
use tessera_kernel::{ContentError, StoreError};
use tessera_kernel::cache::{ContentCache, ManualClock};
use tessera_kernel::compose::Composer;
use tessera_kernel::store::{EntryStore, MemoryEntryStore};
use tessera_sdk::types::{ConfigEntry, DataEntry, NodeFault, RawEntry};
use tessera_test_utils::{assert, block, page_config, raw_config, raw_data, scenarios, test_data};

fn home_store() -> MemoryEntryStore {
    let (configs, datas) = scenarios::home_page();
    let store = MemoryEntryStore::new();
    for config in &configs {
        store.insert("configurations", raw_config(config));
    }
    for data in &datas {
        store.insert("data", raw_data(data));
    }
    store
}

/// Counts fetches and can be told to fail one content type.
struct FlakyStore {
    inner: MemoryEntryStore,
    failing: Option<&'static str>,
    fetches: AtomicUsize,
}

impl FlakyStore {
    fn new(inner: MemoryEntryStore, failing: Option<&'static str>) -> Self {
        Self {
            inner,
            failing,
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EntryStore for FlakyStore {
    async fn fetch_entries_by_type(&self, content_type: &str) -> Result<Vec<RawEntry>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing == Some(content_type) {
            return Err(StoreError::Unavailable("connection reset".into()));
        }
        self.inner.fetch_entries_by_type(content_type).await
    }
}

#[tokio::test]
async fn test_page_by_slug_renders_home() {
    let composer = Composer::new(Arc::new(home_store()));
    let instruction = composer.page_by_slug("/").await.unwrap();
    assert_eq!(instruction.variant, "page:home");
    assert_eq!(instruction.children[0].variant, "component:hero");
    assert!(composer.page_by_slug("/missing").await.is_none());
}

#[tokio::test]
async fn test_render_all_in_link_order() {
    let store = home_store();
    store.insert("configurations", raw_config(&page_config("c2", "insights", "insights")));
    store.insert(
        "data",
        raw_data(&test_data("d3", "c2").block(block("card", json!({ "title": "Q3" })))),
    );
    let composer = Composer::new(Arc::new(store));

    let rendered = composer.render_all().await;
    let variants: Vec<&str> = rendered.iter().map(|r| r.variant.as_str()).collect();
    assert_eq!(variants, vec!["page:home", "page:insights"]);
}

#[tokio::test]
async fn test_failed_side_yields_empty_join() {
    for failing in ["configurations", "data"] {
        let store = Arc::new(FlakyStore::new(home_store(), Some(failing)));
        let composer = Composer::new(store);
        assert!(composer.linked_records().await.is_empty(), "failing {failing}");
    }
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let store = Arc::new(FlakyStore::new(home_store(), Some("data")));
    let composer = Composer::new(store.clone());
    composer.linked_records().await;
    composer.linked_records().await;
    // Configurations fetched once then cached; data retried each time.
    assert_eq!(store.fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_cache_serves_until_max_age() {
    let store = Arc::new(home_store());
    let clock = Arc::new(ManualClock::default());
    let cache = ContentCache::with_clock(Duration::minutes(10), clock.clone());
    let composer = Composer::new(store.clone()).with_cache(cache);

    assert_eq!(composer.pages().await.len(), 1);

    store.insert("configurations", raw_config(&page_config("c2", "generic", "about")));
    store.insert("data", raw_data(&test_data("d3", "c2")));

    clock.advance(Duration::minutes(9));
    assert_eq!(composer.pages().await.len(), 1, "stale but within max age");

    clock.advance(Duration::minutes(2));
    assert_eq!(composer.pages().await.len(), 2, "expired entries refetched");
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let store = Arc::new(home_store());
    let composer = Composer::new(store.clone());
    assert_eq!(composer.pages().await.len(), 1);

    store.insert("configurations", raw_config(&page_config("c2", "generic", "about")));
    store.insert("data", raw_data(&test_data("d3", "c2")));
    assert_eq!(composer.pages().await.len(), 1);

    composer.invalidate();
    assert_eq!(composer.pages().await.len(), 2);
}

fn scenario_store((configs, datas): (Vec<ConfigEntry>, Vec<DataEntry>)) -> MemoryEntryStore {
    let store = MemoryEntryStore::new();
    for config in &configs {
        store.insert("configurations", raw_config(config));
    }
    for data in &datas {
        store.insert("data", raw_data(data));
    }
    store
}

#[tokio::test]
async fn test_max_depth_is_applied() {
    let store = scenario_store(scenarios::reference_chain(10));
    let composer = Composer::new(Arc::new(store)).with_max_depth(2);
    let nodes = composer.resolve_all().await;
    assert_eq!(nodes[0].height(), 4);
}

#[tokio::test]
async fn test_max_nodes_is_applied() {
    let store = scenario_store(scenarios::fan_out(4));
    let composer = Composer::new(Arc::new(store)).with_max_nodes(3);
    let nodes = composer.resolve_all().await;
    assert_eq!(nodes[0].children[1].fault, Some(NodeFault::NodeLimit { limit: 3 }));
    assert!(nodes[0].children[1].children.is_empty());
}

#[tokio::test]
async fn test_slug_nested_under_shape_data() {
    let store = MemoryEntryStore::new();
    store.insert(
        "configurations",
        RawEntry::new(
            "c1",
            json!({
                "type": "Page",
                "data": { "template": "home", "data": { "slug": "about", "title": "About" } }
            })
            .as_object()
            .unwrap()
            .clone(),
        ),
    );
    store.insert(
        "data",
        raw_data(&test_data("d1", "c1").block(block("hero", json!({ "title": "Hi" })))),
    );
    let composer = Composer::new(Arc::new(store));

    let pages = composer.pages().await;
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].config.title(), Some("About"));

    let instruction = composer.page_by_slug("about").await.unwrap();
    assert_eq!(instruction.variant, "page:home");
    assert::children_are(&instruction, &["component:hero"]);
}

#[tokio::test]
async fn test_render_page_reports_missing_slug() {
    let composer = Composer::new(Arc::new(home_store()));
    assert_eq!(composer.render_page("/").await.unwrap().variant, "page:home");

    let err = composer.render_page("/missing").await.unwrap_err();
    assert!(matches!(&err, ContentError::PageNotFound(slug) if slug == "/missing"));
    assert_eq!(err.to_string(), "page not found: /missing");
}

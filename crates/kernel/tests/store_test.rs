#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Directory store tests, end to end through the composer.

use std::sync::Arc;

use tessera_kernel::StoreError;
use tessera_kernel::compose::Composer;
use tessera_kernel::store::{DirEntryStore, EntryStore, parse_config_entries};
use tessera_sdk::render::RenderInstruction;

const CONFIGS: &str = r#"{
  "items": [
    { "sys": { "id": "c1" }, "fields": { "internalName": "Home", "type": "Page",
      "data": { "template": "Home", "slug": "/", "title": "Welcome home" } } },
    { "sys": { "id": "c2" }, "fields": { "type": "Page", "shape": "not an object" } }
  ]
}"#;

const DATA: &str = r#"
- id: d1
  fields:
    type: Page
    configId: c1
    content:
      - Hero:
          props:
            title: Welcome
      - Testimonial:
          props:
            quote: Great
- id: d2
  fields:
    configId: c2
"#;

fn export_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("configurations.json"), CONFIGS).unwrap();
    std::fs::write(dir.path().join("data.yaml"), DATA).unwrap();
    dir
}

#[tokio::test]
async fn test_bad_entries_are_skipped() {
    let dir = export_dir();
    let store = DirEntryStore::new(dir.path());
    let raw = store.fetch_entries_by_type("configurations").await.unwrap();
    assert_eq!(raw.len(), 2);
    let configs = parse_config_entries(&raw);
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].template(), Some("Home"));
}

#[tokio::test]
async fn test_exported_page_renders() {
    let dir = export_dir();
    let composer = Composer::new(Arc::new(DirEntryStore::new(dir.path())));

    // c2 could not be parsed, so d2 is orphaned.
    assert_eq!(composer.linked_records().await.len(), 1);

    let instruction = composer.page_by_slug("/").await.unwrap();
    assert_eq!(instruction.variant, "page:home");
    assert_eq!(instruction.props["title"], "Welcome home");
    let variants: Vec<&str> = instruction.children.iter().map(|c| c.variant.as_str()).collect();
    assert_eq!(variants, vec!["component:hero", "unknown"]);
    assert_eq!(instruction.children[1].props[RenderInstruction::TYPE_TAG_PROP], "Testimonial");
}

#[tokio::test]
async fn test_missing_export_is_empty_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirEntryStore::new(dir.path());
    assert!(matches!(
        store.fetch_entries_by_type("data").await,
        Err(StoreError::UnknownContentType(_))
    ));

    let composer = Composer::new(Arc::new(store));
    assert!(composer.render_all().await.is_empty());
}

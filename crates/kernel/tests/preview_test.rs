#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Preview list tests: reordering, editing and template switching.

use proptest::prelude::*;
use tessera_kernel::content::{Dispatcher, Resolver, link};
use tessera_kernel::preview::{
    ComponentSource, EditState, NewItem, PreviewItem, PreviewList, component_palette,
    starter_template,
};
use tessera_test_utils::scenarios;

fn list_of(ids: &[&str]) -> PreviewList {
    PreviewList::for_record(
        "rec",
        ids.iter()
            .map(|id| PreviewItem::new(*id, "card", id.to_uppercase()))
            .collect(),
    )
}

fn ids(list: &PreviewList) -> Vec<String> {
    list.items().iter().map(|i| i.id.clone()).collect()
}

#[test]
fn test_move_first_to_last() {
    let mut list = list_of(&["a", "b", "c"]);
    list.move_item(0, 2);
    assert_eq!(ids(&list), vec!["b", "c", "a"]);
}

#[test]
fn test_update_twice_equals_once() {
    let mut once = list_of(&["a", "b"]);
    once.update("b", "x");
    let mut twice = list_of(&["a", "b"]);
    twice.update("b", "x");
    twice.update("b", "x");
    assert_eq!(once, twice);
}

#[test]
fn test_palette_insert_then_edit() {
    let mut list = PreviewList::new();
    list.select(&starter_template("generic").unwrap());

    let entry = component_palette()[0];
    let id = list.insert(NewItem::placeholder(entry.item_type, ComponentSource::New));
    assert_eq!(list.get(&id).unwrap().content, "New hero component");

    assert!(list.begin_edit(&id));
    list.set_draft("Spring sale");
    list.commit_edit();
    assert_eq!(list.get(&id).unwrap().content, "Spring sale");
    assert_eq!(list.state(), &EditState::Idle);
}

#[test]
fn test_select_discards_pending_edit() {
    let mut list = PreviewList::new();
    list.select(&starter_template("home").unwrap());
    list.begin_edit("1");
    list.set_draft("unsaved");

    list.select(&starter_template("pressrelease").unwrap());
    assert_eq!(list.state(), &EditState::Idle);
    assert_eq!(list.get("1").unwrap().content, "This is pressrelease hero");
}

#[test]
fn test_preview_from_resolved_page_round_trips_blocks() {
    let (configs, datas) = scenarios::home_page();
    let records = link(&configs, &datas);
    let node = Resolver::with_configs(&configs).resolve(&records[0]);

    let mut list = PreviewList::from_resolved(&records[0].data.id, &node);
    assert_eq!(list.len(), 1);
    assert_eq!(list.items()[0].content, "Welcome");

    let id = list.items()[0].id.clone();
    list.update(&id, "Hello again");

    // Save the edited blocks and load the record again.
    let mut edited = records[0].clone();
    edited.data.content = list.to_blocks();
    let node = Resolver::with_configs(&configs).resolve(&edited);
    let instruction = Dispatcher::with_standard_variants().dispatch(&node);
    assert_eq!(instruction.children[0].variant, "component:hero");
    assert_eq!(instruction.children[0].props["title"], "Hello again");

    let reloaded = PreviewList::from_resolved(&edited.data.id, &node);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.items()[0].content, "Hello again");
}

proptest! {
    #[test]
    fn prop_move_and_move_back_restores_order(len in 1usize..10, from in 0usize..10, to in 0usize..10) {
        let names: Vec<String> = (0..len).map(|i| format!("i{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut list = list_of(&refs);
        let before = list.clone();

        list.move_item(from, to);
        list.move_item(to, from);
        prop_assert_eq!(list, before);
    }

    #[test]
    fn prop_move_preserves_items(len in 1usize..10, from in 0usize..10, to in 0usize..10) {
        let names: Vec<String> = (0..len).map(|i| format!("i{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut list = list_of(&refs);

        list.move_item(from, to);
        let mut got = ids(&list);
        got.sort();
        let mut want = names.clone();
        want.sort();
        prop_assert_eq!(got, want);
    }
}

//! Tessera test utilities.
//!
//! Fixture builders for configuration/data entries and stored blocks, plus
//! a few assertion helpers for render trees.

use serde_json::{Value, json};
use tessera_sdk::render::RenderInstruction;
use tessera_sdk::types::{ConfigEntry, DataEntry, Props, RawEntry};

/// Create a configuration entry with an empty shape.
pub fn test_config(id: &str, type_tag: &str) -> ConfigEntry {
    ConfigEntry::new(id, type_tag).internal_name(format!("{id} config"))
}

/// Create a page configuration with a template and slug.
pub fn page_config(id: &str, template: &str, slug: &str) -> ConfigEntry {
    test_config(id, "Page")
        .shape_field("template", template)
        .shape_field("slug", slug)
}

/// Create a data entry pointing at `config_id`, with no blocks.
pub fn test_data(id: &str, config_id: &str) -> DataEntry {
    DataEntry::new(id, config_id).type_tag("Page")
}

/// Create a data entry with no `configId` at all.
pub fn orphan_data(id: &str) -> DataEntry {
    DataEntry {
        config_id: None,
        ..test_data(id, "")
    }
}

/// A stored block `{ discriminator: { props } }`.
pub fn block(discriminator: &str, props: Value) -> Value {
    json!({ discriminator: { "props": props } })
}

/// A stored block with a nested `config`.
pub fn block_with_config(discriminator: &str, props: Value, config: Value) -> Value {
    json!({ discriminator: { "props": props, "config": config } })
}

/// Props from a JSON object literal. Non-objects give empty props.
pub fn props(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        _ => Props::new(),
    }
}

/// The raw store form of a configuration entry.
pub fn raw_config(config: &ConfigEntry) -> RawEntry {
    RawEntry::new(
        config.id.clone(),
        props(json!({
            "internalName": config.internal_name,
            "type": config.type_tag,
            "shape": config.shape,
        })),
    )
}

/// The raw store form of a data entry.
pub fn raw_data(data: &DataEntry) -> RawEntry {
    let mut fields = props(json!({
        "internalName": data.internal_name,
        "type": data.type_tag,
        "content": data.content,
    }));
    if let Some(config_id) = &data.config_id {
        fields.insert("configId".into(), Value::String(config_id.clone()));
    }
    RawEntry::new(data.id.clone(), fields)
}

/// Ready-made content sets.
pub mod scenarios {
    use super::*;

    /// A home page with a hero, plus an orphaned data entry.
    pub fn home_page() -> (Vec<ConfigEntry>, Vec<DataEntry>) {
        let configs = vec![page_config("c1", "home", "/").shape_field("title", "Home")];
        let datas = vec![
            test_data("d1", "c1").block(block("hero", json!({ "title": "Welcome" }))),
            test_data("d2", "c404"),
        ];
        (configs, datas)
    }

    /// A page whose single block walks a chain of `len` distinct configs,
    /// `link0` through `link{len-1}`, each referencing the next.
    pub fn reference_chain(len: usize) -> (Vec<ConfigEntry>, Vec<DataEntry>) {
        let mut configs = vec![page_config("c1", "generic", "chain")];
        for i in 0..len {
            let mut config = test_config(&format!("link{i}"), "Section");
            if i + 1 < len {
                config = config.shape_field(
                    "content",
                    json!([block_with_config(
                        "section",
                        json!({}),
                        json!({ "configId": format!("link{}", i + 1) })
                    )]),
                );
            }
            configs.push(config);
        }
        let datas = vec![test_data("d1", "c1").block(block_with_config(
            "section",
            json!({}),
            json!({ "configId": "link0" }),
        ))];
        (configs, datas)
    }

    /// A page with `width` blocks referencing config `a`, whose own content
    /// is `width` blocks referencing `a` again.
    pub fn fan_out(width: usize) -> (Vec<ConfigEntry>, Vec<DataEntry>) {
        let reference = || block_with_config("section", json!({}), json!({ "configId": "a" }));
        let configs = vec![
            page_config("c1", "generic", "fan"),
            test_config("a", "Section").shape_field(
                "content",
                Value::Array((0..width).map(|_| reference()).collect()),
            ),
        ];
        let mut data = test_data("d1", "c1");
        for _ in 0..width {
            data = data.block(reference());
        }
        (configs, vec![data])
    }

    /// A config whose shape content references itself.
    pub fn self_referential() -> (Vec<ConfigEntry>, Vec<DataEntry>) {
        let configs = vec![
            page_config("c1", "generic", "loop"),
            test_config("loop", "Section").shape_field(
                "content",
                json!([block_with_config("section", json!({}), json!({ "configId": "loop" }))]),
            ),
        ];
        let datas = vec![test_data("d1", "c1").block(block_with_config(
            "section",
            json!({}),
            json!({ "configId": "loop" }),
        ))];
        (configs, datas)
    }
}

/// Assertion helpers for render trees.
pub mod assert {
    use super::*;

    /// Variant names of an instruction's direct children.
    pub fn child_variants(instruction: &RenderInstruction) -> Vec<&str> {
        instruction
            .children
            .iter()
            .map(|c| c.variant.as_str())
            .collect()
    }

    /// Assert that an instruction has exactly these child variants.
    pub fn children_are(instruction: &RenderInstruction, expected: &[&str]) {
        assert_eq!(
            child_variants(instruction),
            expected,
            "unexpected child variants under '{}'",
            instruction.variant
        );
    }

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{}', got: {}",
            key,
            value
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn page_config_builder() {
        let config = page_config("c1", "home", "/");
        assert_eq!(config.type_tag, "Page");
        assert_eq!(config.template(), Some("home"));
        assert_eq!(config.slug(), Some("/"));
    }

    #[test]
    fn block_shape() {
        let b = block("hero", json!({ "title": "Hi" }));
        assert_eq!(b["hero"]["props"]["title"], "Hi");
        let b = block_with_config("card", json!({}), json!({ "configId": "x" }));
        assert_eq!(b["card"]["config"]["configId"], "x");
    }

    #[test]
    fn raw_forms_keep_fields() {
        let raw = raw_data(&test_data("d1", "c1").block(block("hero", json!({}))));
        assert_eq!(raw.get_str("configId"), Some("c1"));
        assert_eq!(raw.fields["content"].as_array().unwrap().len(), 1);

        let raw = raw_data(&orphan_data("d2"));
        assert!(raw.fields.get("configId").is_none());

        let raw = raw_config(&page_config("c1", "home", "/"));
        assert_eq!(raw.fields["shape"]["template"], "home");
    }

    #[test]
    fn home_scenario() {
        let (configs, datas) = scenarios::home_page();
        assert_eq!(configs.len(), 1);
        assert_eq!(datas.len(), 2);
    }

    #[test]
    fn chain_scenario_links_each_config_to_the_next() {
        let (configs, _) = scenarios::reference_chain(3);
        let ids: Vec<&str> = configs.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "link0", "link1", "link2"]);
        assert_eq!(configs[1].shape["content"][0]["section"]["config"]["configId"], "link1");
        assert!(configs[3].shape.get("content").is_none());
    }
}

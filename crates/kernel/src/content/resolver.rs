//! Resolves linked records into normalized node trees.
//!
//! A record is a page when its configuration shape names a `template`, and a
//! plain component collection otherwise. Stored blocks are normalized from
//! their single-key encoding; blocks whose nested `config` names another
//! configuration entry (`configId`) are expanded with that entry's shape.
//!
//! Nothing here fails. Malformed blocks, dangling nested references, a
//! reference back to a configuration already being expanded, nesting past
//! the depth limit and trees past the node budget each become a terminal
//! node carrying a [`NodeFault`], and the rest of the tree still resolves.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use tessera_sdk::types::{
    ComponentBlock, ConfigEntry, LinkedRecord, NodeFault, Props, ResolvedNode,
};

/// Default maximum nesting depth below the root.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Default maximum number of nodes in one resolved tree, root included.
pub const DEFAULT_MAX_NODES: usize = 10_000;

/// Shape key naming a page template.
const TEMPLATE_KEY: &str = "template";

/// Shape key holding nested stored blocks.
const CONTENT_KEY: &str = "content";

/// Nested config key referencing another configuration entry.
const REFERENCE_KEY: &str = "configId";

/// Resolves [`LinkedRecord`]s into [`ResolvedNode`] trees.
///
/// Holds the configuration entries that nested blocks may reference. The
/// resolver is immutable once built and can be shared across threads.
#[derive(Debug, Clone)]
pub struct Resolver {
    configs: HashMap<String, ConfigEntry>,
    max_depth: usize,
    max_nodes: usize,
}

/// Per-tree bookkeeping while expanding one record.
#[derive(Debug, Default)]
struct Expansion {
    /// Configuration ids being expanded, root first.
    path: Vec<String>,
    /// Nodes produced so far, root included.
    nodes: usize,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Create a resolver with no referenceable configurations.
    pub fn new() -> Self {
        Self {
            configs: HashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }

    /// Create a resolver that can expand nested references into `configs`.
    ///
    /// Duplicate ids resolve last-write-wins, matching the linker.
    pub fn with_configs(configs: &[ConfigEntry]) -> Self {
        Self {
            configs: configs
                .iter()
                .map(|c| (c.id.clone(), c.clone()))
                .collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }

    /// Set the maximum nesting depth. The root is depth 0.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum number of nodes in one tree. Blocks past the budget
    /// become terminal nodes and are not expanded.
    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// The configured nesting limit.
    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }

    /// The configured node budget.
    pub fn node_limit(&self) -> usize {
        self.max_nodes
    }

    /// Resolve a linked record into a node tree.
    pub fn resolve(&self, record: &LinkedRecord) -> ResolvedNode {
        let shape = &record.config.shape;
        let mut node = node_for_shape(&record.config.type_tag, shape, root_props(shape));
        let mut expansion = Expansion {
            path: vec![record.config.id.clone()],
            nodes: 1,
        };
        node.children = self.resolve_blocks(&record.data.content, 1, &mut expansion);
        node
    }

    /// Resolve a sequence of stored blocks at `depth`, keeping source order.
    fn resolve_blocks(
        &self,
        blocks: &[Value],
        depth: usize,
        expansion: &mut Expansion,
    ) -> Vec<ResolvedNode> {
        blocks
            .iter()
            .map(|stored| self.resolve_block(stored, depth, expansion))
            .collect()
    }

    fn resolve_block(&self, stored: &Value, depth: usize, expansion: &mut Expansion) -> ResolvedNode {
        if expansion.nodes >= self.max_nodes {
            warn!(
                depth = depth,
                max_nodes = self.max_nodes,
                "node budget exhausted, truncating branch"
            );
            return ResolvedNode::faulted(NodeFault::NodeLimit {
                limit: self.max_nodes,
            });
        }
        expansion.nodes += 1;

        if depth > self.max_depth {
            warn!(
                depth = depth,
                max_depth = self.max_depth,
                "nesting limit exceeded, truncating branch"
            );
            return ResolvedNode::faulted(NodeFault::RecursionLimit { depth });
        }

        let block = match ComponentBlock::from_stored(stored) {
            Ok(block) => block,
            Err(problem) => {
                debug!(depth = depth, problem = %problem, "malformed component block");
                return ResolvedNode::faulted(NodeFault::MalformedBlock { problem });
            }
        };

        let shape = match block.config.as_ref() {
            None => None,
            Some(config) => match self.nested_shape(config) {
                Ok(shape) => Some(shape),
                Err(config_id) => {
                    debug!(
                        discriminator = %block.discriminator,
                        config_id = %config_id,
                        "nested block references unknown configuration"
                    );
                    return ResolvedNode::faulted(NodeFault::MissingReference { config_id });
                }
            },
        };

        let Some(shape) = shape else {
            return ResolvedNode::component(block.discriminator, block.props);
        };

        let reference = block
            .config
            .as_ref()
            .and_then(|config| config.get(REFERENCE_KEY))
            .and_then(Value::as_str);
        if let Some(config_id) = reference
            && expansion.path.iter().any(|id| id == config_id)
        {
            warn!(
                discriminator = %block.discriminator,
                config_id = %config_id,
                path = ?expansion.path,
                "reference cycle, truncating branch"
            );
            return ResolvedNode::faulted(NodeFault::Cycle {
                config_id: config_id.to_string(),
            });
        }

        let mut node = node_for_shape(&block.discriminator, &shape, block.props);
        if let Some(nested) = shape.get(CONTENT_KEY).and_then(Value::as_array) {
            if let Some(config_id) = reference {
                expansion.path.push(config_id.to_string());
            }
            node.children = self.resolve_blocks(nested, depth + 1, expansion);
            if reference.is_some() {
                expansion.path.pop();
            }
        }
        node
    }

    /// Shape for a block's nested config, substituting a referenced entry.
    ///
    /// Keys set directly on the block's config override the referenced shape.
    /// Returns the dangling id on a missing reference.
    fn nested_shape<'a>(&'a self, config: &'a Props) -> Result<Cow<'a, Props>, String> {
        let Some(config_id) = config.get(REFERENCE_KEY).and_then(Value::as_str) else {
            return Ok(Cow::Borrowed(config));
        };

        let Some(referenced) = self.configs.get(config_id) else {
            return Err(config_id.to_string());
        };

        if config.len() == 1 {
            return Ok(Cow::Borrowed(&referenced.shape));
        }

        let mut merged = referenced.shape.clone();
        for (key, value) in config {
            if key != REFERENCE_KEY {
                merged.insert(key.clone(), value.clone());
            }
        }
        Ok(Cow::Owned(merged))
    }
}

/// Build a node whose kind is decided by the shape's template.
fn node_for_shape(type_tag: &str, shape: &Props, props: Props) -> ResolvedNode {
    match shape.get(TEMPLATE_KEY).and_then(Value::as_str) {
        Some(template) => ResolvedNode::page(type_tag, template, props),
        None => ResolvedNode::component(type_tag, props),
    }
}

/// Page-level props: the shape without structural keys.
fn root_props(shape: &Props) -> Props {
    shape
        .iter()
        .filter(|(key, _)| key.as_str() != TEMPLATE_KEY && key.as_str() != CONTENT_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_sdk::types::{DataEntry, MalformedBlock, NodeKind};

    fn record(config: ConfigEntry, content: Vec<Value>) -> LinkedRecord {
        let mut data = DataEntry::new("d1", config.id.clone());
        data.content = content;
        LinkedRecord { config, data }
    }

    #[test]
    fn home_page_scenario() {
        let config = ConfigEntry::new("c1", "Page").shape_field("template", "home");
        let node = Resolver::new().resolve(&record(
            config,
            vec![json!({ "hero": { "props": { "title": "Welcome" } } })],
        ));

        assert_eq!(node.kind, NodeKind::Page);
        assert_eq!(node.template.as_deref(), Some("home"));
        assert_eq!(node.children.len(), 1);
        let hero = &node.children[0];
        assert_eq!(hero.kind, NodeKind::Component);
        assert_eq!(hero.type_tag, "hero");
        assert_eq!(hero.props["title"], "Welcome");
        assert!(hero.fault.is_none());
    }

    #[test]
    fn no_template_means_component_collection() {
        let config = ConfigEntry::new("c1", "Collection").shape_field("title", "Sidebar");
        let node = Resolver::new().resolve(&record(config, vec![]));
        assert_eq!(node.kind, NodeKind::Component);
        assert!(node.template.is_none());
        assert_eq!(node.type_tag, "Collection");
        assert_eq!(node.props["title"], "Sidebar");
    }

    #[test]
    fn non_string_template_is_not_a_page() {
        let config = ConfigEntry::new("c1", "Page").shape_field("template", json!(3));
        let node = Resolver::new().resolve(&record(config, vec![]));
        assert_eq!(node.kind, NodeKind::Component);
    }

    #[test]
    fn root_props_drop_structural_keys() {
        let config = ConfigEntry::new("c1", "Page")
            .shape_field("template", "generic")
            .shape_field("slug", "/about")
            .shape_field("content", json!([]));
        let node = Resolver::new().resolve(&record(config, vec![]));
        assert_eq!(node.props.len(), 1);
        assert_eq!(node.props["slug"], "/about");
    }

    #[test]
    fn children_keep_source_order() {
        let config = ConfigEntry::new("c1", "Page").shape_field("template", "generic");
        let node = Resolver::new().resolve(&record(
            config,
            vec![
                json!({ "hero": {} }),
                json!({ "card": {} }),
                json!({ "image": {} }),
                json!({ "card": {} }),
            ],
        ));
        let tags: Vec<&str> = node.children.iter().map(|c| c.type_tag.as_str()).collect();
        assert_eq!(tags, vec!["hero", "card", "image", "card"]);
    }

    #[test]
    fn multi_key_block_becomes_unknown() {
        let config = ConfigEntry::new("c1", "Page").shape_field("template", "home");
        let node = Resolver::new().resolve(&record(
            config,
            vec![
                json!({ "carousel": { "props": {} }, "extra": {} }),
                json!({ "hero": {} }),
            ],
        ));
        let bad = &node.children[0];
        assert_eq!(bad.type_tag, ResolvedNode::UNKNOWN_TYPE);
        assert_eq!(
            bad.fault,
            Some(NodeFault::MalformedBlock {
                problem: MalformedBlock::MultipleKeys(vec!["carousel".into(), "extra".into()])
            })
        );
        // The sibling still resolves.
        assert_eq!(node.children[1].type_tag, "hero");
    }

    #[test]
    fn inline_nested_shape_expands_children() {
        let config = ConfigEntry::new("c1", "Page").shape_field("template", "home");
        let node = Resolver::new().resolve(&record(
            config,
            vec![json!({
                "section": {
                    "props": { "heading": "Latest" },
                    "config": {
                        "content": [
                            { "card": { "props": { "title": "One" } } },
                            { "card": { "props": { "title": "Two" } } }
                        ]
                    }
                }
            })],
        ));
        let section = &node.children[0];
        assert_eq!(section.kind, NodeKind::Component);
        assert_eq!(section.props["heading"], "Latest");
        assert_eq!(section.children.len(), 2);
        assert_eq!(section.children[1].props["title"], "Two");
    }

    #[test]
    fn nested_template_makes_a_page_node() {
        let config = ConfigEntry::new("c1", "Page").shape_field("template", "home");
        let node = Resolver::new().resolve(&record(
            config,
            vec![json!({ "embedded": { "config": { "template": "insights" } } })],
        ));
        let embedded = &node.children[0];
        assert_eq!(embedded.kind, NodeKind::Page);
        assert_eq!(embedded.template.as_deref(), Some("insights"));
    }

    #[test]
    fn reference_substitutes_shape_with_local_overrides() {
        let teaser = ConfigEntry::new("teaser", "Section")
            .shape_field("template", "generic")
            .shape_field("content", json!([{ "button": { "props": { "label": "Go" } } }]));
        let page = ConfigEntry::new("c1", "Page").shape_field("template", "home");
        let resolver = Resolver::with_configs(&[teaser, page.clone()]);

        let node = resolver.resolve(&record(
            page,
            vec![json!({
                "promo": { "config": { "configId": "teaser", "template": "insights" } }
            })],
        ));
        let promo = &node.children[0];
        assert_eq!(promo.template.as_deref(), Some("insights"));
        assert_eq!(promo.children.len(), 1);
        assert_eq!(promo.children[0].type_tag, "button");
    }

    #[test]
    fn dangling_reference_is_terminal() {
        let page = ConfigEntry::new("c1", "Page").shape_field("template", "home");
        let node = Resolver::new().resolve(&record(
            page,
            vec![json!({ "promo": { "config": { "configId": "gone" } } })],
        ));
        assert_eq!(
            node.children[0].fault,
            Some(NodeFault::MissingReference {
                config_id: "gone".into()
            })
        );
    }

    /// Config `id` whose nested content is `blocks` references to `target`.
    fn fan_out(id: &str, target: &str, blocks: usize) -> ConfigEntry {
        let content: Vec<Value> = (0..blocks)
            .map(|_| json!({ "loop": { "config": { "configId": target } } }))
            .collect();
        ConfigEntry::new(id, "Section")
            .shape_field("template", "generic")
            .shape_field("content", Value::Array(content))
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let looping = fan_out("a", "a", 1);
        let resolver = Resolver::with_configs(std::slice::from_ref(&looping));

        let node = resolver.resolve(&record(
            looping,
            vec![json!({ "loop": { "config": { "configId": "a" } } })],
        ));

        assert_eq!(node.node_count(), 2);
        assert_eq!(
            node.children[0].fault,
            Some(NodeFault::Cycle {
                config_id: "a".into()
            })
        );
    }

    #[test]
    fn fan_out_self_reference_stays_small() {
        let looping = fan_out("a", "a", 4);
        let root = ConfigEntry::new("root", "Page").shape_field("template", "home");
        let resolver = Resolver::with_configs(&[looping, root.clone()]);

        let node = resolver.resolve(&record(
            root,
            vec![json!({ "loop": { "config": { "configId": "a" } } }); 4],
        ));

        // Each top-level block expands `a` once; its four references to `a`
        // are cut off as cycles.
        assert_eq!(node.height(), 3);
        assert_eq!(node.node_count(), 1 + 4 + 4 * 4);
        for child in &node.children {
            assert!(child.fault.is_none());
            assert!(child.children.iter().all(|grandchild| matches!(
                &grandchild.fault,
                Some(NodeFault::Cycle { config_id }) if config_id == "a"
            )));
        }
    }

    #[test]
    fn sibling_references_are_not_cycles() {
        let shared = ConfigEntry::new("shared", "Card").shape_field("content", json!([{ "text": {} }]));
        let root = ConfigEntry::new("root", "Page").shape_field("template", "home");
        let resolver = Resolver::with_configs(&[shared, root.clone()]);

        let node = resolver.resolve(&record(
            root,
            vec![json!({ "card": { "config": { "configId": "shared" } } }); 2],
        ));
        assert_eq!(node.node_count(), 5);
        assert!(node.children.iter().all(|c| c.fault.is_none()));
    }

    #[test]
    fn distinct_chain_stops_at_depth_limit() {
        let mut configs: Vec<ConfigEntry> = (0..10)
            .map(|i| fan_out(&format!("c{i}"), &format!("c{}", i + 1), 1))
            .collect();
        configs.push(ConfigEntry::new("root", "Page").shape_field("template", "home"));
        let resolver = Resolver::with_configs(&configs).max_depth(5);

        let node = resolver.resolve(&record(
            configs[10].clone(),
            vec![json!({ "loop": { "config": { "configId": "c0" } } })],
        ));

        // Levels 0..=5 resolve normally, level 6 is the terminal marker.
        assert_eq!(node.height(), 7);
        let mut deepest = &node;
        while let Some(child) = deepest.children.first() {
            deepest = child;
        }
        assert_eq!(deepest.fault, Some(NodeFault::RecursionLimit { depth: 6 }));
    }

    #[test]
    fn diamond_fan_out_respects_node_budget() {
        // Five layers of distinct configs, each referencing the next four
        // times: no cycle, but 4^5 leaves without a budget.
        let mut configs: Vec<ConfigEntry> = (0..5)
            .map(|i| fan_out(&format!("c{i}"), &format!("c{}", i + 1), 4))
            .collect();
        configs.push(ConfigEntry::new("c5", "Leaf"));
        configs.push(ConfigEntry::new("root", "Page").shape_field("template", "home"));
        let resolver = Resolver::with_configs(&configs).max_nodes(50);
        assert_eq!(resolver.node_limit(), 50);

        let node = resolver.resolve(&record(
            configs[6].clone(),
            vec![json!({ "loop": { "config": { "configId": "c0" } } })],
        ));

        let mut truncated = 0;
        let mut stack = vec![&node];
        while let Some(n) = stack.pop() {
            if matches!(n.fault, Some(NodeFault::NodeLimit { limit: 50 })) {
                truncated += 1;
                assert!(n.children.is_empty());
            }
            stack.extend(n.children.iter());
        }
        assert!(truncated > 0);
        // Only the blocks already listed beside a truncated one can add
        // terminal markers past the budget.
        assert!(node.node_count() <= 50 + 4 * 5);
    }

    #[test]
    fn depth_limit_zero_truncates_all_blocks() {
        let config = ConfigEntry::new("c1", "Page").shape_field("template", "home");
        let node = Resolver::new().max_depth(0).resolve(&record(
            config,
            vec![json!({ "hero": {} })],
        ));
        assert_eq!(
            node.children[0].fault,
            Some(NodeFault::RecursionLimit { depth: 1 })
        );
    }
}

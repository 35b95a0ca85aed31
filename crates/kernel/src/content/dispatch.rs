//! Dispatches resolved nodes to renderer variants.
//!
//! Two tables map canonical discriminators onto the closed variant set:
//! one keyed by page `template`, one keyed by component `typeTag`. Dispatch
//! is total: a page with an unregistered template falls back to the generic
//! template, and an unregistered component (or any faulted node) becomes the
//! `unknown` variant. Unknown CMS content degrades, it never breaks a page.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use tessera_sdk::render::RenderInstruction;
use tessera_sdk::types::{NodeKind, ResolvedNode};

use super::variants::{ComponentKind, PageTemplate, Variant, check_props};

/// Canonical form of a discriminator: trimmed, ASCII lower-case.
///
/// The CMS mixes casing ("Card" vs "card"); lookups always go through this.
pub fn canonicalize(discriminator: &str) -> String {
    discriminator.trim().to_ascii_lowercase()
}

/// Maps resolved nodes to render instructions.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    templates: HashMap<String, PageTemplate>,
    components: HashMap<String, ComponentKind>,
    fallback_template: PageTemplate,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Create a dispatcher with empty tables.
    ///
    /// Every page dispatches to the generic template and every component to
    /// `unknown` until discriminators are registered.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            components: HashMap::new(),
            fallback_template: PageTemplate::Generic,
        }
    }

    /// Create a dispatcher with every template and component kind registered
    /// under its canonical name.
    pub fn with_standard_variants() -> Self {
        let mut dispatcher = Self::new();
        for template in PageTemplate::ALL {
            dispatcher.register_template(template.name(), template);
        }
        for kind in ComponentKind::ALL {
            dispatcher.register_component(kind.name(), kind);
        }
        dispatcher
    }

    /// Map a template discriminator (canonicalized) onto a template.
    pub fn register_template(&mut self, discriminator: &str, template: PageTemplate) {
        self.templates.insert(canonicalize(discriminator), template);
    }

    /// Map a component discriminator (canonicalized) onto a component kind.
    pub fn register_component(&mut self, discriminator: &str, kind: ComponentKind) {
        self.components.insert(canonicalize(discriminator), kind);
    }

    /// Number of registered template and component discriminators.
    pub fn len(&self) -> usize {
        self.templates.len() + self.components.len()
    }

    /// Check whether no discriminators are registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty() && self.components.is_empty()
    }

    /// Look up a template discriminator.
    pub fn template(&self, discriminator: &str) -> Option<PageTemplate> {
        self.templates.get(&canonicalize(discriminator)).copied()
    }

    /// Look up a component discriminator.
    pub fn component(&self, discriminator: &str) -> Option<ComponentKind> {
        self.components.get(&canonicalize(discriminator)).copied()
    }

    /// Pick the variant for a single node, without looking at children.
    pub fn variant_for(&self, node: &ResolvedNode) -> Variant {
        if node.fault.is_some() {
            return Variant::Unknown;
        }

        match node.kind {
            NodeKind::Page => {
                let template = node.template.as_deref().and_then(|t| self.template(t));
                Variant::Page(template.unwrap_or_else(|| {
                    debug!(
                        template = ?node.template,
                        fallback = self.fallback_template.name(),
                        "unregistered page template"
                    );
                    self.fallback_template
                }))
            }
            NodeKind::Component => match self.component(&node.type_tag) {
                Some(kind) => Variant::Component(kind),
                None => {
                    debug!(type_tag = %node.type_tag, "unregistered component type");
                    Variant::Unknown
                }
            },
        }
    }

    /// Dispatch a node tree into a render instruction tree.
    pub fn dispatch(&self, node: &ResolvedNode) -> RenderInstruction {
        let variant = self.variant_for(node);
        let mut props = node.props.clone();

        let dropped = match variant {
            Variant::Page(template) => check_props(&mut props, template.prop_specs()),
            Variant::Component(kind) => check_props(&mut props, kind.prop_specs()),
            Variant::Unknown => {
                props.insert(
                    RenderInstruction::TYPE_TAG_PROP.into(),
                    Value::String(node.type_tag.clone()),
                );
                if let Some(fault) = &node.fault
                    && let Ok(fault) = serde_json::to_value(fault)
                {
                    props.insert(RenderInstruction::FAULT_PROP.into(), fault);
                }
                Vec::new()
            }
        };

        if !dropped.is_empty() {
            warn!(
                variant = %variant.name(),
                type_tag = %node.type_tag,
                props = ?dropped,
                "dropping props with unexpected types"
            );
        }

        RenderInstruction {
            variant: variant.name(),
            props,
            children: node.children.iter().map(|c| self.dispatch(c)).collect(),
        }
    }
}

//! Renderer variants and the props each one reads.
//!
//! The variant set is closed: page templates and component kinds are enums.
//! Which discriminator strings map onto them is decided by the
//! [`Dispatcher`](super::dispatch::Dispatcher) tables.

use serde_json::Value;

use tessera_sdk::types::Props;

/// Page-level layout templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageTemplate {
    Home,
    Insights,
    PressRelease,
    Generic,
}

impl PageTemplate {
    pub const ALL: [PageTemplate; 4] = [
        PageTemplate::Home,
        PageTemplate::Insights,
        PageTemplate::PressRelease,
        PageTemplate::Generic,
    ];

    /// Canonical discriminator for this template.
    pub fn name(self) -> &'static str {
        match self {
            PageTemplate::Home => "home",
            PageTemplate::Insights => "insights",
            PageTemplate::PressRelease => "pressrelease",
            PageTemplate::Generic => "generic",
        }
    }

    pub(crate) fn prop_specs(self) -> &'static [PropSpec] {
        PAGE_PROPS
    }
}

/// Component-level renderer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Hero,
    Card,
    Image,
    Form,
    Carousel,
    Button,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::Hero,
        ComponentKind::Card,
        ComponentKind::Image,
        ComponentKind::Form,
        ComponentKind::Carousel,
        ComponentKind::Button,
    ];

    /// Canonical discriminator for this kind.
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Hero => "hero",
            ComponentKind::Card => "card",
            ComponentKind::Image => "image",
            ComponentKind::Form => "form",
            ComponentKind::Carousel => "carousel",
            ComponentKind::Button => "button",
        }
    }

    /// Props this kind reads, with the JSON type each must have.
    pub(crate) fn prop_specs(self) -> &'static [PropSpec] {
        match self {
            ComponentKind::Hero => HERO_PROPS,
            ComponentKind::Card => CARD_PROPS,
            ComponentKind::Image => IMAGE_PROPS,
            ComponentKind::Form => FORM_PROPS,
            ComponentKind::Carousel => CAROUSEL_PROPS,
            ComponentKind::Button => BUTTON_PROPS,
        }
    }
}

const PAGE_PROPS: &[PropSpec] = &[
    PropSpec::new("title", PropType::String),
    PropSpec::new("slug", PropType::String),
];

const HERO_PROPS: &[PropSpec] = &[
    PropSpec::new("title", PropType::String),
    PropSpec::new("subtitle", PropType::String),
    PropSpec::new("backgroundImage", PropType::String),
    PropSpec::new("ctaText", PropType::String),
    PropSpec::new("ctaUrl", PropType::String),
];

const CARD_PROPS: &[PropSpec] = &[
    PropSpec::new("title", PropType::String),
    PropSpec::new("description", PropType::String),
    PropSpec::new("imageUrl", PropType::String),
    PropSpec::new("linkUrl", PropType::String),
];

const IMAGE_PROPS: &[PropSpec] = &[
    PropSpec::new("src", PropType::String),
    PropSpec::new("alt", PropType::String),
    PropSpec::new("caption", PropType::String),
];

const FORM_PROPS: &[PropSpec] = &[
    PropSpec::new("fields", PropType::Array),
    PropSpec::new("submitUrl", PropType::String),
];

const CAROUSEL_PROPS: &[PropSpec] = &[PropSpec::new("images", PropType::Array)];

const BUTTON_PROPS: &[PropSpec] = &[
    PropSpec::new("label", PropType::String),
    PropSpec::new("url", PropType::String),
];

/// The renderer a node is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Page(PageTemplate),
    Component(ComponentKind),
    Unknown,
}

impl Variant {
    /// Variant name as written into a render instruction.
    pub fn name(self) -> String {
        match self {
            Variant::Page(template) => format!("page:{}", template.name()),
            Variant::Component(kind) => format!("component:{}", kind.name()),
            Variant::Unknown => "unknown".to_string(),
        }
    }
}

/// JSON type a prop must have for the variant that reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropType {
    String,
    Array,
}

impl PropType {
    fn matches(self, value: &Value) -> bool {
        match self {
            PropType::String => value.is_string(),
            PropType::Array => value.is_array(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PropSpec {
    name: &'static str,
    kind: PropType,
}

impl PropSpec {
    const fn new(name: &'static str, kind: PropType) -> Self {
        Self { name, kind }
    }
}

/// Drop read props whose JSON type is wrong, returning the dropped names.
///
/// Props the variant does not read pass through untouched, and absent props
/// are fine: renderers supply their own defaults.
pub(crate) fn check_props(props: &mut Props, specs: &[PropSpec]) -> Vec<&'static str> {
    let mut dropped = Vec::new();
    for spec in specs {
        let wrong_type = props
            .get(spec.name)
            .is_some_and(|value| !value.is_null() && !spec.kind.matches(value));
        if wrong_type {
            props.remove(spec.name);
            dropped.push(spec.name);
        }
    }
    dropped
}

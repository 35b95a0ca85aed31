//! Built-in starter templates and the component palette.

use super::list::{PreviewItem, PreviewList};

/// A named starting layout for the preview list.
#[derive(Debug, Clone, PartialEq)]
pub struct StarterTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub items: Vec<PreviewItem>,
}

/// A component type offered for insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub item_type: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The four starter templates, in display order.
pub fn starter_templates() -> Vec<StarterTemplate> {
    vec![
        StarterTemplate {
            id: "home",
            name: "Home Page",
            items: vec![
                PreviewItem::new("1", "hero", "This is home hero"),
                PreviewItem::new("2", "Carousel", "This is carousel."),
                PreviewItem::new("3", "card", "This is Card"),
                PreviewItem::new("4", "form", "This is form"),
                PreviewItem::new("5", "image", "This is image").read_only(),
            ],
        },
        StarterTemplate {
            id: "insights",
            name: "Insights",
            items: vec![
                PreviewItem::new("1", "hero", "This is Insight hero"),
                PreviewItem::new("2", "Card", "insight card..."),
                PreviewItem::new("3", "image", "insight Image").read_only(),
                PreviewItem::new("4", "form", "insight form"),
            ],
        },
        StarterTemplate {
            id: "pressrelease",
            name: "Pressrelease",
            items: vec![
                PreviewItem::new("1", "hero", "This is pressrelease hero"),
                PreviewItem::new("2", "image", "Product Image").read_only(),
                PreviewItem::new("3", "card", "Product description..."),
                PreviewItem::new("4", "form", "subscribe"),
            ],
        },
        StarterTemplate {
            id: "generic",
            name: "Generic",
            items: vec![
                PreviewItem::new("1", "hero", "This is generic hero"),
                PreviewItem::new("2", "card", "Get in touch with us..."),
                PreviewItem::new("3", "form", "Contact Form").read_only(),
                PreviewItem::new("4", "image", "Address: 123 Main St"),
            ],
        },
    ]
}

/// Find a starter template by id.
pub fn starter_template(id: &str) -> Option<StarterTemplate> {
    starter_templates().into_iter().find(|t| t.id == id)
}

/// Component types offered by the editor palette.
pub fn component_palette() -> &'static [PaletteEntry] {
    const PALETTE: &[PaletteEntry] = &[
        PaletteEntry {
            item_type: "hero",
            name: "Hero Section",
            description: "Large banner with title and background",
        },
        PaletteEntry {
            item_type: "card",
            name: "Content Card",
            description: "Card layout for content blocks",
        },
        PaletteEntry {
            item_type: "image",
            name: "Image Component",
            description: "Image display with placeholder",
        },
        PaletteEntry {
            item_type: "form",
            name: "Contact Form",
            description: "Form for user input",
        },
        PaletteEntry {
            item_type: "Carousel",
            name: "Image Carousel",
            description: "Rotating image gallery",
        },
    ];
    PALETTE
}

impl PreviewList {
    /// Replace the list with a starter template's components.
    pub fn select(&mut self, template: &StarterTemplate) {
        self.reset(template.id, template.items.clone());
    }
}

//! Editor preview engine.
//!
//! The preview list is plain single-owner state: an ordered list of items and
//! an idle/editing state machine. UI layers translate their events into calls
//! on [`PreviewList`]; nothing here knows about drag sources or timers.

pub mod catalog;
pub mod list;

pub use catalog::{PaletteEntry, StarterTemplate, component_palette, starter_template, starter_templates};
pub use list::{ComponentSource, EditState, NewItem, PreviewItem, PreviewList};

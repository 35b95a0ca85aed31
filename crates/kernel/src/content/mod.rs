//! Content resolution and composition.
//!
//! This module provides:
//! - Linker: joins data entries to configuration entries
//! - Resolver: expands linked records into normalized node trees
//! - Dispatcher: maps nodes to renderer variants with total fallback
//! - Variants: the closed set of page templates and component kinds

pub mod dispatch;
pub mod linker;
pub mod resolver;
pub mod variants;

pub use dispatch::{Dispatcher, canonicalize};
pub use linker::{LinkReport, link, link_with_report};
pub use resolver::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, Resolver};
pub use variants::{ComponentKind, PageTemplate, Variant};

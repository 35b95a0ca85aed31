//! Tessera content kernel.
//!
//! Joins CMS configuration and data entries, resolves them into component
//! trees, dispatches the trees to renderer variants, and backs the editor's
//! preview list. The `tessera` binary drives it over exported entry files.

pub mod cache;
pub mod compose;
pub mod config;
pub mod content;
pub mod error;
pub mod preview;
pub mod store;

pub use compose::Composer;
pub use config::Config;
pub use error::{ContentError, ContentResult, EntryParseError, StoreError};

//! Boundary error types.
//!
//! Only I/O at the edge can fail. Content problems inside entries (dangling
//! references, malformed blocks, unknown discriminators) are recovered in
//! place and never show up here.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from listing entries out of a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown content type '{0}'")]
    UnknownContentType(String),

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse YAML in {}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("{}: expected an array of entries or an object with an `items` array", .path.display())]
    UnexpectedLayout { path: PathBuf },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Why a raw entry could not be read as a configuration or data entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntryParseError {
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Errors surfaced by the composer and binary.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("page not found: {0}")]
    PageNotFound(String),

    #[error("failed to serialize output")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias using ContentError.
pub type ContentResult<T> = Result<T, ContentError>;

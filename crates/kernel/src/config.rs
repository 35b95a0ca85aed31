//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

use crate::cache::DEFAULT_MAX_AGE_SECS;
use crate::content::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES};

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory of exported entry files (default: ./content).
    pub content_dir: PathBuf,

    /// Content type holding configuration entries (default: configurations).
    pub config_type: String,

    /// Content type holding data entries (default: data).
    pub data_type: String,

    /// How long fetched collections stay cached (default: 600 seconds).
    pub cache_max_age: Duration,

    /// Resolver recursion limit (default: 16).
    pub max_depth: usize,

    /// Resolver node budget per tree (default: 10000).
    pub max_nodes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("./content"),
            config_type: "configurations".to_string(),
            data_type: "data".to_string(),
            cache_max_age: Duration::seconds(DEFAULT_MAX_AGE_SECS),
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let content_dir = lookup("TESSERA_CONTENT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.content_dir);

        let config_type = lookup("TESSERA_CONFIG_TYPE").unwrap_or(defaults.config_type);
        let data_type = lookup("TESSERA_DATA_TYPE").unwrap_or(defaults.data_type);

        let cache_max_age = match lookup("TESSERA_CACHE_MAX_AGE_SECS") {
            Some(raw) => {
                let secs: i64 = raw
                    .trim()
                    .parse()
                    .context("TESSERA_CACHE_MAX_AGE_SECS must be a whole number of seconds")?;
                if secs < 0 {
                    bail!("TESSERA_CACHE_MAX_AGE_SECS must not be negative");
                }
                Duration::seconds(secs)
            }
            None => defaults.cache_max_age,
        };

        let max_depth = match lookup("TESSERA_MAX_DEPTH") {
            Some(raw) => raw
                .trim()
                .parse()
                .context("TESSERA_MAX_DEPTH must be a valid usize")?,
            None => defaults.max_depth,
        };

        let max_nodes = match lookup("TESSERA_MAX_NODES") {
            Some(raw) => raw
                .trim()
                .parse()
                .context("TESSERA_MAX_NODES must be a valid usize")?,
            None => defaults.max_nodes,
        };

        Ok(Self {
            content_dir,
            config_type,
            data_type,
            cache_max_age,
            max_depth,
            max_nodes,
        })
    }
}

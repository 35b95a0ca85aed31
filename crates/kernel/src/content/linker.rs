//! Joins data entries to their configuration entries.
//!
//! The store does not enforce `configId`, so the join is lenient: a data
//! entry whose configuration is missing is treated as orphaned content and
//! dropped, never reported as an error.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use tessera_sdk::types::{ConfigEntry, DataEntry, LinkedRecord};

/// Side information collected while linking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Data entries dropped because their `configId` is missing or dangling.
    pub orphaned: Vec<String>,
    /// Configuration ids referenced by more than one data entry.
    pub shared_configs: Vec<String>,
    /// Configuration ids that appeared more than once in the input.
    pub duplicate_configs: Vec<String>,
}

impl LinkReport {
    /// True when nothing was dropped or flagged.
    pub fn is_clean(&self) -> bool {
        self.orphaned.is_empty() && self.shared_configs.is_empty() && self.duplicate_configs.is_empty()
    }
}

/// Join data entries to configuration entries via `configId`.
///
/// Output order follows `datas`. Duplicate configuration ids resolve
/// last-write-wins.
pub fn link(configs: &[ConfigEntry], datas: &[DataEntry]) -> Vec<LinkedRecord> {
    link_with_report(configs, datas).0
}

/// Like [`link`], also returning what was dropped or flagged.
///
/// A configuration referenced by several data entries is unsupported: every
/// such record is still emitted (nothing is merged) and the id is listed in
/// [`LinkReport::shared_configs`].
pub fn link_with_report(
    configs: &[ConfigEntry],
    datas: &[DataEntry],
) -> (Vec<LinkedRecord>, LinkReport) {
    let mut report = LinkReport::default();

    let mut by_id: HashMap<&str, &ConfigEntry> = HashMap::with_capacity(configs.len());
    for config in configs {
        if by_id.insert(config.id.as_str(), config).is_some()
            && !report.duplicate_configs.contains(&config.id)
        {
            report.duplicate_configs.push(config.id.clone());
        }
    }

    let mut records = Vec::with_capacity(datas.len());
    let mut referenced: HashSet<&str> = HashSet::new();

    for data in datas {
        let Some(config) = data
            .config_id
            .as_deref()
            .and_then(|config_id| by_id.get(config_id))
        else {
            debug!(
                data_id = %data.id,
                config_id = ?data.config_id,
                "dropping data entry without configuration"
            );
            report.orphaned.push(data.id.clone());
            continue;
        };

        if !referenced.insert(config.id.as_str()) && !report.shared_configs.contains(&config.id) {
            report.shared_configs.push(config.id.clone());
        }

        records.push(LinkedRecord {
            config: (*config).clone(),
            data: data.clone(),
        });
    }

    for config_id in &report.duplicate_configs {
        warn!(config_id = %config_id, "duplicate configuration id, last entry wins");
    }
    for config_id in &report.shared_configs {
        warn!(
            config_id = %config_id,
            "configuration referenced by more than one data entry"
        );
    }

    (records, report)
}

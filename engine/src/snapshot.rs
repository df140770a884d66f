//! Snapshot types for persisting and restoring a [`MemoryStore`] of items.
//!
//! Records are written in a deterministic order (group, index, ID) so the
//! same state always serializes to the same JSON. Every group is checked for
//! contiguity on restore.

use crate::{contiguity, error::Result, Error, Item, MemoryStore, SortConfig, SortIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time snapshot of ordered items and their configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    /// Ordering configuration the records were maintained under
    pub config: SortConfig,
    /// All records, ordered by group, index and ID
    pub records: Vec<Item>,
}

impl StoreSnapshot {
    /// Create an empty snapshot.
    pub fn new(config: SortConfig) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            config,
            records: Vec::new(),
        }
    }

    /// Capture the records of a store.
    pub fn capture(config: &SortConfig, store: &MemoryStore<Item>) -> Self {
        let mut snapshot = Self::new(config.clone());
        snapshot.records = store.records().cloned().collect();
        snapshot.records.sort_by(|a, b| {
            a.group
                .cmp(&b.group)
                .then_with(|| a.sort_index.cmp(&b.sort_index))
                .then_with(|| a.id.cmp(&b.id))
        });
        snapshot
    }

    /// Count records in the snapshot.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Indices of each group, keyed by group (`None` for ungrouped
    /// configurations and for records without a key).
    fn group_indices(&self) -> BTreeMap<Option<&str>, Vec<SortIndex>> {
        let mut groups: BTreeMap<Option<&str>, Vec<SortIndex>> = BTreeMap::new();
        for record in &self.records {
            let key = if self.config.is_grouped() {
                record.group.as_deref()
            } else {
                None
            };
            groups.entry(key).or_default().push(record.sort_index);
        }
        groups
    }

    /// Validate format, configuration, ID uniqueness and contiguity.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported format version {}",
                self.format_version
            )));
        }

        self.config
            .validate()
            .map_err(|e| Error::InvalidSnapshot(e.to_string()))?;

        let mut seen = BTreeSet::new();
        for record in &self.records {
            if !seen.insert(record.id.as_str()) {
                return Err(Error::InvalidSnapshot(format!(
                    "duplicate record ID '{}'",
                    record.id
                )));
            }
        }

        for (group, indices) in self.group_indices() {
            if let Some((expected, found)) =
                contiguity::first_violation(indices, self.config.start_sorting_from)
            {
                return Err(Error::InvalidSnapshot(format!(
                    "group '{}' is not contiguous: expected index {expected}, found {found}",
                    group.unwrap_or("<none>")
                )));
            }
        }

        Ok(())
    }

    /// Validate and rebuild the store.
    pub fn restore(self) -> Result<MemoryStore<Item>> {
        self.validate()?;
        Ok(MemoryStore::with_records(self.records))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON. The result is not validated until restored.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }
}

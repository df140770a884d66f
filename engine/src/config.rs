//! Per-record-type ordering configuration.
//!
//! Each sortable record type carries one [`SortConfig`]. Field names are
//! opaque identities used for diagnostics; values are always read through the
//! typed [`Sortable`](crate::Sortable) accessors.

use crate::{error::Result, Error, SortIndex};
use serde::{Deserialize, Serialize};

/// Default first index of every group.
pub const DEFAULT_START: SortIndex = 1;

/// Default name of the sort index field.
pub const DEFAULT_INDEX_FIELD: &str = "sort_index";

/// Ordering configuration for one record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortConfig {
    /// First index of every group
    pub start_sorting_from: SortIndex,
    /// Name of the field holding the sort index
    pub sort_index_field: String,
    /// Name of the field partitioning records into groups (`None` = ungrouped)
    pub group_key_field: Option<String>,
    /// Whether new records get `max + 1` assigned on creation
    pub assign_index_on_create: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            start_sorting_from: DEFAULT_START,
            sort_index_field: DEFAULT_INDEX_FIELD.to_string(),
            group_key_field: None,
            assign_index_on_create: true,
        }
    }
}

impl SortConfig {
    /// Create the default, ungrouped configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set the first index.
    pub fn with_start(mut self, start: SortIndex) -> Self {
        self.start_sorting_from = start;
        self
    }

    /// Builder-style method to rename the sort index field.
    pub fn with_index_field(mut self, field: impl Into<String>) -> Self {
        self.sort_index_field = field.into();
        self
    }

    /// Builder-style method to partition records by a group key field.
    pub fn grouped_by(mut self, field: impl Into<String>) -> Self {
        self.group_key_field = Some(field.into());
        self
    }

    /// Builder-style method to leave index assignment to the caller.
    pub fn without_auto_assign(mut self) -> Self {
        self.assign_index_on_create = false;
        self
    }

    /// Whether records are partitioned into groups.
    pub fn is_grouped(&self) -> bool {
        self.group_key_field.is_some()
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.start_sorting_from < 0 {
            return Err(Error::InvalidConfig(format!(
                "startSortingFrom must not be negative, got {}",
                self.start_sorting_from
            )));
        }

        if self.sort_index_field.is_empty() {
            return Err(Error::InvalidConfig(
                "sortIndexField must not be empty".into(),
            ));
        }

        if matches!(&self.group_key_field, Some(f) if f.is_empty()) {
            return Err(Error::InvalidConfig(
                "groupKeyField must not be empty when set".into(),
            ));
        }

        Ok(())
    }
}

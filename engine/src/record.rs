//! Sortable record types.

use crate::{RecordId, SortIndex};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Capability a host record type implements to be ordered by the engine.
///
/// The engine never touches any other part of the record and never changes
/// its group key.
pub trait Sortable: Clone {
    /// Stable identity of the record.
    type Id: Clone + Eq + Ord + Hash + Debug;
    /// Value partitioning records into groups. Displayed in logs and errors.
    type GroupKey: Clone + Eq + Hash + Debug + Display;

    fn id(&self) -> &Self::Id;

    fn sort_index(&self) -> SortIndex;

    fn set_sort_index(&mut self, index: SortIndex);

    /// Group membership; `None` is the group of records without a key.
    fn group_key(&self) -> Option<&Self::GroupKey>;
}

/// A general purpose sortable record carrying a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier for this record
    pub id: RecordId,
    /// Group the record is ordered within
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Position within the group
    pub sort_index: SortIndex,
    /// The actual data payload (JSON value)
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Item {
    /// Create an ungrouped record. Its index is assigned on creation.
    pub fn new(id: impl Into<RecordId>, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            group: None,
            sort_index: 0,
            payload,
        }
    }

    /// Builder-style method to place the record in a group.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Builder-style method to set an explicit index.
    pub fn at_index(mut self, index: SortIndex) -> Self {
        self.sort_index = index;
        self
    }
}

impl Sortable for Item {
    type Id = RecordId;
    type GroupKey = String;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn sort_index(&self) -> SortIndex {
        self.sort_index
    }

    fn set_sort_index(&mut self, index: SortIndex) {
        self.sort_index = index;
    }

    fn group_key(&self) -> Option<&String> {
        self.group.as_ref()
    }
}

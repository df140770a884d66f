//! Operation types for expressing reorder requests.
//!
//! Hosts that receive reorder requests as data (a queue, an undo log, a
//! batch file) can deserialize them into [`Operation`] and hand them to
//! [`OrderingEngine::apply`].

use crate::store::RecordStore;
use crate::{error::Result, Item, OrderingEngine, RecordId, SortIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A reorder request against a store of [`Item`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    /// Insert a record, assigning its index
    Create { record: Item },
    /// Move a record to an index, shifting siblings
    SetIndex { id: RecordId, index: SortIndex },
    /// Write an index without shifting siblings
    SetIndexWithoutResort { id: RecordId, index: SortIndex },
    /// Remove a record and close the gap
    Delete { id: RecordId },
    MoveUp { id: RecordId },
    MoveDown { id: RecordId },
    ToTop { id: RecordId },
    ToBottom { id: RecordId },
    /// Exchange the indices of two records in the same group
    Swap { first: RecordId, second: RecordId },
}

impl Operation {
    /// Get the ID of the record this operation targets.
    pub fn record_id(&self) -> &RecordId {
        match self {
            Operation::Create { record } => &record.id,
            Operation::SetIndex { id, .. }
            | Operation::SetIndexWithoutResort { id, .. }
            | Operation::Delete { id }
            | Operation::MoveUp { id }
            | Operation::MoveDown { id }
            | Operation::ToTop { id }
            | Operation::ToBottom { id } => id,
            Operation::Swap { first, .. } => first,
        }
    }

    /// Get a short name of the operation kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Create { .. } => "create",
            Operation::SetIndex { .. } => "setIndex",
            Operation::SetIndexWithoutResort { .. } => "setIndexWithoutResort",
            Operation::Delete { .. } => "delete",
            Operation::MoveUp { .. } => "moveUp",
            Operation::MoveDown { .. } => "moveDown",
            Operation::ToTop { .. } => "toTop",
            Operation::ToBottom { .. } => "toBottom",
            Operation::Swap { .. } => "swap",
        }
    }
}

/// Index of a record after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// The record ID
    pub record_id: RecordId,
    /// Its index after the operation (former index for a deleted record)
    pub sort_index: SortIndex,
}

/// Result of applying an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    /// The operation kind that was applied
    pub kind: String,
    /// The targeted record
    pub placement: Placement,
    /// The other record of a swap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart: Option<Placement>,
    /// Whether the targeted record was removed
    #[serde(default)]
    pub deleted: bool,
}

impl ApplyResult {
    fn placed(op: &Operation, sort_index: SortIndex) -> Self {
        Self {
            kind: op.kind().to_string(),
            placement: Placement {
                record_id: op.record_id().clone(),
                sort_index,
            },
            counterpart: None,
            deleted: false,
        }
    }
}

impl OrderingEngine {
    /// Apply an operation to the store.
    pub fn apply<S>(&self, store: &mut S, op: Operation) -> Result<ApplyResult>
    where
        S: RecordStore<Record = Item>,
    {
        let result = match &op {
            Operation::Create { record } => {
                let index = self.create(store, record.clone())?;
                ApplyResult::placed(&op, index)
            }
            Operation::SetIndex { id, index } => {
                let index = self.update_index(store, id, *index)?;
                ApplyResult::placed(&op, index)
            }
            Operation::SetIndexWithoutResort { id, index } => {
                let index = self.set_index_without_resort(store, id, *index)?;
                ApplyResult::placed(&op, index)
            }
            Operation::Delete { id } => {
                let removed = self.delete(store, id)?;
                let mut result = ApplyResult::placed(&op, removed.sort_index);
                result.deleted = true;
                result
            }
            Operation::MoveUp { id } => ApplyResult::placed(&op, self.move_up(store, id)?),
            Operation::MoveDown { id } => ApplyResult::placed(&op, self.move_down(store, id)?),
            Operation::ToTop { id } => ApplyResult::placed(&op, self.to_top(store, id)?),
            Operation::ToBottom { id } => ApplyResult::placed(&op, self.to_bottom(store, id)?),
            Operation::Swap { first, second } => {
                let (index_first, index_second) = self.swap(store, first, second)?;
                let mut result = ApplyResult::placed(&op, index_first);
                result.counterpart = Some(Placement {
                    record_id: second.clone(),
                    sort_index: index_second,
                });
                result
            }
        };

        debug!(
            kind = op.kind(),
            record = %result.placement.record_id,
            index = result.placement.sort_index,
            "applied operation"
        );
        Ok(result)
    }

    /// Apply operations in order, stopping at the first failure.
    ///
    /// Each operation is its own transaction: operations before a failing one
    /// stay applied.
    pub fn apply_all<S>(
        &self,
        store: &mut S,
        ops: impl IntoIterator<Item = Operation>,
    ) -> Result<Vec<ApplyResult>>
    where
        S: RecordStore<Record = Item>,
    {
        ops.into_iter().map(|op| self.apply(store, op)).collect()
    }
}

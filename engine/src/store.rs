//! Record store contract and the in-memory reference store.
//!
//! The engine reads and writes records only through [`RecordStore`]. Every
//! engine operation runs inside one [`RecordStore::transaction`], so a store
//! must either apply all writes of the closure or none of them.

use crate::{error::Result, Error, SortIndex, Sortable};
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::RangeInclusive;
use tracing::{trace, warn};

/// Identity type of a store's records.
pub type IdOf<S> = <<S as RecordStore>::Record as Sortable>::Id;
/// Group key type of a store's records.
pub type KeyOf<S> = <<S as RecordStore>::Record as Sortable>::GroupKey;
/// Group scope over a store's records.
pub type ScopeOf<S> = GroupScope<KeyOf<S>>;
/// Index filter over a store's records.
pub type FilterOf<S> = IndexFilter<IdOf<S>, KeyOf<S>>;

/// The set of records sharing one ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupScope<K> {
    /// Every record of the type (ungrouped configuration)
    All,
    /// Records whose group key equals this one (`None` = records without a key)
    Group(Option<K>),
}

impl<K: PartialEq> GroupScope<K> {
    /// Check whether a record with the given key falls in this scope.
    pub fn contains(&self, key: Option<&K>) -> bool {
        match self {
            GroupScope::All => true,
            GroupScope::Group(group) => group.as_ref() == key,
        }
    }
}

impl<K: Display> GroupScope<K> {
    /// Human readable name for logs and errors.
    pub fn label(&self) -> String {
        match self {
            GroupScope::All => "<all>".to_string(),
            GroupScope::Group(None) => "<none>".to_string(),
            GroupScope::Group(Some(key)) => key.to_string(),
        }
    }
}

/// Predicate selecting the records a bulk shift applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFilter<I, K> {
    /// Group the records must belong to
    pub scope: GroupScope<K>,
    /// Inclusive range of sort indices to match
    pub range: RangeInclusive<SortIndex>,
    /// Record never matched, even when its index is in range
    pub exclude: Option<I>,
}

impl<I: PartialEq, K: PartialEq> IndexFilter<I, K> {
    /// Create a filter over a scope and index range.
    pub fn new(scope: GroupScope<K>, range: RangeInclusive<SortIndex>) -> Self {
        Self {
            scope,
            range,
            exclude: None,
        }
    }

    /// Builder-style method to exclude one record.
    pub fn excluding(mut self, id: I) -> Self {
        self.exclude = Some(id);
        self
    }

    /// Check whether a record is matched by this filter.
    pub fn matches<R>(&self, record: &R) -> bool
    where
        R: Sortable<Id = I, GroupKey = K>,
    {
        self.scope.contains(record.group_key())
            && self.range.contains(&record.sort_index())
            && self.exclude.as_ref() != Some(record.id())
    }
}

/// Collaborator contract the ordering engine needs from persistence.
///
/// Writers take `&mut self`: conflicting operations on one store are
/// serialized by ownership. A store shared between processes must serialize
/// conflicting operations on the same group itself.
pub trait RecordStore {
    type Record: Sortable;

    /// Read a record by ID.
    fn get(&self, id: &IdOf<Self>) -> Result<Self::Record>;

    /// Insert or overwrite a record.
    fn persist(&mut self, record: Self::Record) -> Result<()>;

    /// Remove a record, returning its last known state.
    fn remove(&mut self, id: &IdOf<Self>) -> Result<Self::Record>;

    /// Highest sort index in a group, `None` when the group is empty.
    fn max_index_in_group(&self, scope: &ScopeOf<Self>) -> Result<Option<SortIndex>>;

    /// Add one to the index of every matching record. Returns the match count.
    fn bulk_increment(&mut self, filter: &FilterOf<Self>) -> Result<usize>;

    /// Subtract one from the index of every matching record. Returns the match count.
    fn bulk_decrement(&mut self, filter: &FilterOf<Self>) -> Result<usize>;

    /// All records of a group, in no particular order.
    fn records_in_group(&self, scope: &ScopeOf<Self>) -> Result<Vec<Self::Record>>;

    /// Run `f` atomically: on error no write made by `f` may remain visible.
    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>;
}

/// In-memory record store with all-or-nothing transactions.
#[derive(Debug, Clone)]
pub struct MemoryStore<R: Sortable> {
    records: HashMap<R::Id, R>,
}

impl<R: Sortable> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Sortable> MemoryStore<R> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Create a store holding the given records as-is, without assigning
    /// or checking their indices.
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id().clone(), r)).collect(),
        }
    }

    /// Get a stored record by ID.
    pub fn find(&self, id: &R::Id) -> Option<&R> {
        self.records.get(id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &R::Id) -> bool {
        self.records.contains_key(id)
    }

    /// All stored records, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    /// Count of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn shift(
        &mut self,
        filter: &IndexFilter<R::Id, R::GroupKey>,
        delta: SortIndex,
    ) -> Result<usize> {
        // Checked up front so an overflow leaves every record as it was.
        let mut shifted = Vec::new();
        for record in self.records.values().filter(|r| filter.matches(*r)) {
            let index = record
                .sort_index()
                .checked_add(delta)
                .ok_or_else(|| Error::index_overflow(record.sort_index()))?;
            shifted.push((record.id().clone(), index));
        }
        for (id, index) in &shifted {
            if let Some(record) = self.records.get_mut(id) {
                record.set_sort_index(*index);
            }
        }
        trace!(
            group = %filter.scope.label(),
            from = filter.range.start(),
            to = filter.range.end(),
            delta,
            shifted = shifted.len(),
            "bulk shift"
        );
        Ok(shifted.len())
    }
}

impl<R: Sortable> RecordStore for MemoryStore<R> {
    type Record = R;

    fn get(&self, id: &R::Id) -> Result<R> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| Error::RecordNotFound(format!("{id:?}")))
    }

    fn persist(&mut self, record: R) -> Result<()> {
        self.records.insert(record.id().clone(), record);
        Ok(())
    }

    fn remove(&mut self, id: &R::Id) -> Result<R> {
        self.records
            .remove(id)
            .ok_or_else(|| Error::RecordNotFound(format!("{id:?}")))
    }

    fn max_index_in_group(&self, scope: &GroupScope<R::GroupKey>) -> Result<Option<SortIndex>> {
        Ok(self
            .records
            .values()
            .filter(|r| scope.contains(r.group_key()))
            .map(Sortable::sort_index)
            .max())
    }

    fn bulk_increment(&mut self, filter: &IndexFilter<R::Id, R::GroupKey>) -> Result<usize> {
        self.shift(filter, 1)
    }

    fn bulk_decrement(&mut self, filter: &IndexFilter<R::Id, R::GroupKey>) -> Result<usize> {
        self.shift(filter, -1)
    }

    fn records_in_group(&self, scope: &GroupScope<R::GroupKey>) -> Result<Vec<R>> {
        Ok(self
            .records
            .values()
            .filter(|r| scope.contains(r.group_key()))
            .cloned()
            .collect())
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved = self.records.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(error = %err, "rolling back record store transaction");
                self.records = saved;
                Err(err)
            }
        }
    }
}

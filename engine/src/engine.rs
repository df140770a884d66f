//! The ordering engine.
//!
//! [`OrderingEngine`] keeps the sort indices of every group contiguous. It
//! exposes the three lifecycle hooks a host calls around its own persistence
//! ([`before_create`](OrderingEngine::before_create),
//! [`before_update`](OrderingEngine::before_update),
//! [`after_delete`](OrderingEngine::after_delete)) and transactional
//! operations built on them.
//!
//! Every public operation that writes runs inside exactly one
//! [`RecordStore::transaction`]; a failing step leaves the store untouched.

use crate::contiguity;
use crate::store::{FilterOf, GroupScope, IdOf, IndexFilter, KeyOf, RecordStore, ScopeOf};
use crate::{error::Result, Error, SortConfig, SortIndex, Sortable};
use tracing::{debug, trace, warn};

/// Whether an index change shifts the record's siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resort {
    /// Shift siblings so the group stays contiguous
    Siblings,
    /// Write the index alone; the caller keeps the group consistent
    Suppressed,
}

/// Direction of a sorted query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Maintains contiguous sort indices for one record type.
#[derive(Debug, Clone, Default)]
pub struct OrderingEngine {
    config: SortConfig,
}

impl OrderingEngine {
    /// Create an engine, validating its configuration.
    pub fn new(config: SortConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// First index of every group.
    pub fn start(&self) -> SortIndex {
        self.config.start_sorting_from
    }

    /// The group a record is ordered within.
    pub fn scope_of<R: Sortable>(&self, record: &R) -> GroupScope<R::GroupKey> {
        self.scope_for(record.group_key())
    }

    /// The group for a key. Ungrouped configurations ignore the key.
    pub fn scope_for<K: Clone>(&self, key: Option<&K>) -> GroupScope<K> {
        if self.config.is_grouped() {
            GroupScope::Group(key.cloned())
        } else {
            GroupScope::All
        }
    }

    /// Filter predicate matching records in the same group as `record`.
    pub fn same_group<R: Sortable>(&self, record: &R) -> impl Fn(&R) -> bool {
        let scope = self.scope_of(record);
        move |other: &R| scope.contains(other.group_key())
    }

    /// Index a new record would get at the end of its group.
    ///
    /// This is `max + 1` over the stored records of the group, or
    /// `start_sorting_from` for an empty group.
    pub fn next_index<S: RecordStore>(&self, store: &S, record: &S::Record) -> Result<SortIndex> {
        let last = self.last_index(store, record)?;
        last.checked_add(1).ok_or_else(|| Error::index_overflow(last))
    }

    /// Creation hook: assign the next free index unless auto assignment is
    /// disabled, in which case the caller's index is kept.
    pub fn before_create<S: RecordStore>(&self, store: &S, record: &mut S::Record) -> Result<()> {
        if self.config.assign_index_on_create {
            let index = self.next_index(store, record)?;
            debug!(
                record = ?record.id(),
                field = %self.config.sort_index_field,
                index,
                "assigned sort index on create"
            );
            record.set_sort_index(index);
        } else if record.sort_index() < 0 {
            warn!(record = ?record.id(), index = record.sort_index(), "rejected create");
            return Err(Error::negative_index(record.sort_index()));
        }
        Ok(())
    }

    /// Insert a record, assigning its index. Returns the index it was stored at.
    pub fn create<S: RecordStore>(&self, store: &mut S, mut record: S::Record) -> Result<SortIndex> {
        store.transaction(|store| {
            match store.get(record.id()) {
                Ok(_) => return Err(Error::RecordAlreadyExists(format!("{:?}", record.id()))),
                Err(Error::RecordNotFound(_)) => {}
                Err(err) => return Err(err),
            }
            self.before_create(&*store, &mut record)?;
            let index = record.sort_index();
            store.persist(record)?;
            Ok(index)
        })
    }

    /// Update hook: shift the siblings of `record` for a move from `old` to
    /// `new`. Does not write `record` itself. Returns the number of siblings
    /// shifted.
    pub fn before_update<S: RecordStore>(
        &self,
        store: &mut S,
        record: &S::Record,
        old: SortIndex,
        new: SortIndex,
    ) -> Result<usize> {
        let scope = self.scope_of(record);
        let shifted = if new > old {
            let filter: FilterOf<S> =
                IndexFilter::new(scope, (old + 1)..=new).excluding(record.id().clone());
            store.bulk_decrement(&filter)?
        } else if new < old {
            let filter: FilterOf<S> =
                IndexFilter::new(scope, new..=(old - 1)).excluding(record.id().clone());
            store.bulk_increment(&filter)?
        } else {
            0
        };

        debug!(
            record = ?record.id(),
            field = %self.config.sort_index_field,
            from = old,
            to = new,
            shifted,
            "resorted siblings"
        );
        Ok(shifted)
    }

    /// Deletion hook: close the gap left by a removed record. Returns the
    /// number of siblings shifted.
    pub fn after_delete<S: RecordStore>(&self, store: &mut S, deleted: &S::Record) -> Result<usize> {
        // Nothing can sit above the largest index.
        let shifted = match deleted.sort_index().checked_add(1) {
            Some(above) => {
                let filter: FilterOf<S> =
                    IndexFilter::new(self.scope_of(deleted), above..=SortIndex::MAX);
                store.bulk_decrement(&filter)?
            }
            None => 0,
        };

        debug!(
            record = ?deleted.id(),
            index = deleted.sort_index(),
            shifted,
            "closed gap after delete"
        );
        Ok(shifted)
    }

    /// Remove a record and close the gap it leaves. Returns the removed record.
    pub fn delete<S: RecordStore>(&self, store: &mut S, id: &IdOf<S>) -> Result<S::Record> {
        store.transaction(|store| {
            let record = store.remove(id)?;
            self.after_delete(store, &record)?;
            Ok(record)
        })
    }

    /// Set a record's index, shifting siblings or not. Returns the new index.
    ///
    /// With [`Resort::Siblings`] the target must lie within the group's
    /// current range, since any other target would leave a gap.
    pub fn apply_index_change<S: RecordStore>(
        &self,
        store: &mut S,
        id: &IdOf<S>,
        new: SortIndex,
        resort: Resort,
    ) -> Result<SortIndex> {
        store.transaction(|store| {
            let record = store.get(id)?;
            self.change_index(store, record, new, resort)
        })
    }

    /// Move a record to `index`, shifting siblings. Returns the new index.
    pub fn update_index<S: RecordStore>(
        &self,
        store: &mut S,
        id: &IdOf<S>,
        index: SortIndex,
    ) -> Result<SortIndex> {
        self.apply_index_change(store, id, index, Resort::Siblings)
    }

    /// Alias of [`update_index`](Self::update_index).
    pub fn move_to<S: RecordStore>(
        &self,
        store: &mut S,
        id: &IdOf<S>,
        index: SortIndex,
    ) -> Result<SortIndex> {
        self.update_index(store, id, index)
    }

    /// Write an index without shifting any sibling. Returns the new index.
    pub fn set_index_without_resort<S: RecordStore>(
        &self,
        store: &mut S,
        id: &IdOf<S>,
        index: SortIndex,
    ) -> Result<SortIndex> {
        self.apply_index_change(store, id, index, Resort::Suppressed)
    }

    /// Move a record one position towards the start. No-op at the start.
    pub fn move_up<S: RecordStore>(&self, store: &mut S, id: &IdOf<S>) -> Result<SortIndex> {
        store.transaction(|store| {
            let record = store.get(id)?;
            let current = record.sort_index();
            if current == self.start() {
                trace!(record = ?id, index = current, "already at top");
                return Ok(current);
            }
            self.change_index(store, record, current - 1, Resort::Siblings)
        })
    }

    /// Move a record one position towards the end. No-op at the end.
    pub fn move_down<S: RecordStore>(&self, store: &mut S, id: &IdOf<S>) -> Result<SortIndex> {
        store.transaction(|store| {
            let record = store.get(id)?;
            let current = record.sort_index();
            let last = self.last_index(&*store, &record)?;
            if current == last {
                trace!(record = ?id, index = current, "already at bottom");
                return Ok(current);
            }
            self.change_index(store, record, current + 1, Resort::Siblings)
        })
    }

    /// Move a record to the start of its group.
    pub fn to_top<S: RecordStore>(&self, store: &mut S, id: &IdOf<S>) -> Result<SortIndex> {
        store.transaction(|store| {
            let record = store.get(id)?;
            self.change_index(store, record, self.start(), Resort::Siblings)
        })
    }

    /// Move a record to the end of its group.
    pub fn to_bottom<S: RecordStore>(&self, store: &mut S, id: &IdOf<S>) -> Result<SortIndex> {
        store.transaction(|store| {
            let record = store.get(id)?;
            let last = self.last_index(&*store, &record)?;
            self.change_index(store, record, last, Resort::Siblings)
        })
    }

    /// Exchange the indices of two records of the same group. No other
    /// record is touched. Returns the new indices of `first` and `second`.
    pub fn swap<S: RecordStore>(
        &self,
        store: &mut S,
        first: &IdOf<S>,
        second: &IdOf<S>,
    ) -> Result<(SortIndex, SortIndex)> {
        store.transaction(|store| {
            let a = store.get(first)?;
            let b = store.get(second)?;
            if self.scope_of(&a) != self.scope_of(&b) {
                warn!(first = ?first, second = ?second, "rejected cross-group swap");
                return Err(Error::CrossGroupOperation {
                    first: format!("{first:?}"),
                    second: format!("{second:?}"),
                });
            }
            if first == second {
                return Ok((a.sort_index(), b.sort_index()));
            }

            let (index_a, index_b) = (a.sort_index(), b.sort_index());
            self.change_index(store, a, index_b, Resort::Suppressed)?;
            self.change_index(store, b, index_a, Resort::Suppressed)?;
            debug!(first = ?first, second = ?second, index_a, index_b, "swapped");
            Ok((index_b, index_a))
        })
    }

    /// A group's records ordered by index, ties broken by ID.
    ///
    /// Ungrouped configurations return every record regardless of `group`.
    pub fn sorted<S: RecordStore>(
        &self,
        store: &S,
        group: Option<&KeyOf<S>>,
        direction: Direction,
    ) -> Result<Vec<S::Record>> {
        let scope: ScopeOf<S> = self.scope_for(group);
        let mut records = store.records_in_group(&scope)?;
        records.sort_by(|a, b| {
            a.sort_index()
                .cmp(&b.sort_index())
                .then_with(|| a.id().cmp(b.id()))
        });
        if direction == Direction::Descending {
            records.reverse();
        }
        Ok(records)
    }

    /// A group's records from first to last.
    pub fn sorted_ascending<S: RecordStore>(
        &self,
        store: &S,
        group: Option<&KeyOf<S>>,
    ) -> Result<Vec<S::Record>> {
        self.sorted(store, group, Direction::Ascending)
    }

    /// A group's records from last to first.
    pub fn sorted_descending<S: RecordStore>(
        &self,
        store: &S,
        group: Option<&KeyOf<S>>,
    ) -> Result<Vec<S::Record>> {
        self.sorted(store, group, Direction::Descending)
    }

    /// Check that a group's indices are contiguous from `start_sorting_from`.
    pub fn verify_group<S: RecordStore>(&self, store: &S, group: Option<&KeyOf<S>>) -> Result<()> {
        let scope: ScopeOf<S> = self.scope_for(group);
        let indices = store
            .records_in_group(&scope)?
            .iter()
            .map(Sortable::sort_index)
            .collect::<Vec<_>>();

        match contiguity::first_violation(indices, self.start()) {
            None => Ok(()),
            Some((expected, found)) => Err(Error::ContiguityViolation {
                group: scope.label(),
                expected,
                found,
            }),
        }
    }

    /// Renumber a group to `start..start + N`, keeping its current order.
    /// Returns the number of records rewritten.
    pub fn reindex_group<S: RecordStore>(
        &self,
        store: &mut S,
        group: Option<&KeyOf<S>>,
    ) -> Result<usize> {
        let scope: ScopeOf<S> = self.scope_for(group);
        store.transaction(|store| {
            let records = store.records_in_group(&scope)?;
            let plan = contiguity::renumber_plan(records, self.start());
            let rewritten = plan.len();
            for (id, index) in plan {
                let record = store.get(&id)?;
                self.change_index(store, record, index, Resort::Suppressed)?;
            }
            debug!(group = %scope.label(), rewritten, "reindexed group");
            Ok(rewritten)
        })
    }

    // Highest index in the record's group, `start - 1` when it is empty.
    fn last_index<S: RecordStore>(&self, store: &S, record: &S::Record) -> Result<SortIndex> {
        let scope = self.scope_of(record);
        Ok(store
            .max_index_in_group(&scope)?
            .unwrap_or(self.start() - 1))
    }

    // Single write path for index changes; callers hold the transaction.
    fn change_index<S: RecordStore>(
        &self,
        store: &mut S,
        mut record: S::Record,
        new: SortIndex,
        resort: Resort,
    ) -> Result<SortIndex> {
        if new < 0 {
            warn!(record = ?record.id(), index = new, "rejected index change");
            return Err(Error::negative_index(new));
        }

        let old = record.sort_index();
        if old == new {
            return Ok(new);
        }

        if resort == Resort::Siblings {
            let last = self.last_index(&*store, &record)?;
            if new < self.start() || new > last {
                warn!(record = ?record.id(), index = new, "rejected index change");
                return Err(Error::out_of_range(new, self.start(), last));
            }
            self.before_update(store, &record, old, new)?;
        }

        record.set_sort_index(new);
        store.persist(record)?;
        Ok(new)
    }
}

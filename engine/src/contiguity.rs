//! Checks and repair plans for the contiguity invariant.
//!
//! A group of N records is contiguous when its indices are exactly
//! `start..start + N`, with no gaps and no duplicates.

use crate::{SortIndex, Sortable};

/// First position at which a set of indices departs from `start..`.
///
/// Returns `(expected, found)` for the lowest offending slot, or `None` when
/// the indices are contiguous.
pub fn first_violation(
    indices: impl IntoIterator<Item = SortIndex>,
    start: SortIndex,
) -> Option<(SortIndex, SortIndex)> {
    let mut indices: Vec<SortIndex> = indices.into_iter().collect();
    indices.sort_unstable();

    indices
        .into_iter()
        .zip(start..)
        .find(|(found, expected)| found != expected)
        .map(|(found, expected)| (expected, found))
}

/// Check whether a set of indices is contiguous from `start`.
pub fn is_contiguous(indices: impl IntoIterator<Item = SortIndex>, start: SortIndex) -> bool {
    first_violation(indices, start).is_none()
}

/// Index assignments that renumber a group to `start..start + N`.
///
/// Current relative order is kept, ties broken by ID. Only records whose
/// index actually changes are listed.
pub fn renumber_plan<R: Sortable>(mut records: Vec<R>, start: SortIndex) -> Vec<(R::Id, SortIndex)> {
    records.sort_by(|a, b| {
        a.sort_index()
            .cmp(&b.sort_index())
            .then_with(|| a.id().cmp(b.id()))
    });

    records
        .into_iter()
        .zip(start..)
        .filter(|(record, target)| record.sort_index() != *target)
        .map(|(record, target)| (record.id().clone(), target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Item;
    use serde_json::json;

    #[test]
    fn contiguous_sets() {
        assert!(is_contiguous(vec![], 1));
        assert!(is_contiguous(vec![3, 1, 2], 1));
        assert!(is_contiguous(vec![0, 1], 0));
    }

    #[test]
    fn reports_gap() {
        assert_eq!(first_violation(vec![1, 2, 4], 1), Some((3, 4)));
    }

    #[test]
    fn reports_duplicate() {
        assert_eq!(first_violation(vec![1, 2, 2], 1), Some((3, 2)));
    }

    #[test]
    fn reports_wrong_start() {
        assert_eq!(first_violation(vec![2, 3], 1), Some((1, 2)));
    }

    #[test]
    fn renumber_keeps_order_and_breaks_ties_by_id() {
        let records = vec![
            Item::new("c", json!({})).at_index(7),
            Item::new("b", json!({})).at_index(3),
            Item::new("a", json!({})).at_index(3),
            Item::new("d", json!({})).at_index(1),
        ];

        let plan = renumber_plan(records, 1);
        assert_eq!(
            plan,
            vec![
                ("a".to_string(), 2),
                ("b".to_string(), 3),
                ("c".to_string(), 4),
            ]
        );
    }

    #[test]
    fn renumber_of_contiguous_group_is_empty() {
        let records = vec![
            Item::new("a", json!({})).at_index(1),
            Item::new("b", json!({})).at_index(2),
        ];
        assert!(renumber_plan(records, 1).is_empty());
    }
}

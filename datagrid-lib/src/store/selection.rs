//! Row selection helpers

use std::collections::HashSet;

use crate::model::Row;
use crate::model::RowId;

/// Computes the selection after a select-all toggle over `data`.
///
/// If every row of `data` is already selected, those rows are removed.
/// Otherwise `data` is appended to the selection. The result is
/// de-duplicated by identity, keeping the first occurrence, and rows are
/// tagged with `group` when one is given.
pub(crate) fn toggle_all(data: &[Row], selected: &[Row], group: Option<&str>) -> Vec<Row> {
    let data_ids: HashSet<RowId> = data.iter().map(Row::identity).collect();
    let selected_ids: HashSet<RowId> = selected.iter().map(Row::identity).collect();
    let remove_all = data_ids.is_subset(&selected_ids);

    let candidates: Vec<&Row> = if remove_all {
        selected
            .iter()
            .filter(|row| !data_ids.contains(&row.identity()))
            .collect()
    } else {
        selected.iter().chain(data).collect()
    };

    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|row| seen.insert(row.identity()))
        .map(|row| match group {
            Some(group) => row.clone().with_group(group),
            None => row.clone(),
        })
        .collect()
}

/// Returns `true` if both selections hold the same set of identities.
pub(crate) fn same_selection(a: &[Row], b: &[Row]) -> bool {
    let a: HashSet<RowId> = a.iter().map(Row::identity).collect();
    let b: HashSet<RowId> = b.iter().map(Row::identity).collect();
    a == b
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(id: u32) -> Row {
        Row::new(json!({ "id": id }))
    }

    fn ids(rows: &[Row]) -> Vec<u64> {
        rows.iter().filter_map(|r| r.id().and_then(|v| v.as_u64())).collect()
    }

    #[test]
    fn test_selects_missing_rows() {
        let data = vec![row(1), row(2), row(3)];
        let selected = vec![row(9), row(2)];

        let next = toggle_all(&data, &selected, None);
        assert_eq!(ids(&next), vec![9, 2, 1, 3]);
    }

    #[test]
    fn test_deselects_when_all_selected() {
        let data = vec![row(1), row(2)];
        let selected = vec![row(2), row(7), row(1)];

        let next = toggle_all(&data, &selected, None);
        assert_eq!(ids(&next), vec![7]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let data = vec![Row::new(json!({ "id": 1, "v": "data" })), row(2)];
        let selected = vec![Row::new(json!({ "id": 1, "v": "selected" }))];

        let next = toggle_all(&data, &selected, None);
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].get("v"), Some(&json!("selected")));
    }

    #[test]
    fn test_group_tags_untagged_rows_only() {
        let data = vec![row(1), row(2)];
        let selected = vec![Row::new(json!({ "id": 5, "tableName": "orders" }))];

        let next = toggle_all(&data, &selected, Some("users"));
        let groups: Vec<_> = next.iter().map(Row::group).collect();
        assert_eq!(groups, vec![Some("orders"), Some("users"), Some("users")]);
    }

    #[test]
    fn test_empty_data_keeps_selection() {
        let selected = vec![row(1), row(1)];
        let next = toggle_all(&[], &selected, None);
        assert_eq!(ids(&next), vec![1]);
    }

    #[test]
    fn test_same_selection_ignores_order() {
        assert!(same_selection(&[row(1), row(2)], &[row(2), row(1)]));
        assert!(!same_selection(&[row(1)], &[row(1), row(2)]));
        assert!(same_selection(&[], &[]));
    }
}

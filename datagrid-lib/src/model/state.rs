//! Table state record

use std::sync::Arc;

use super::Params;
use super::Row;
use super::TableQuery;
use crate::error::TableError;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The complete state of a table controller.
///
/// Query fields (`page`, `page_size`, `search`, `filters`, `sorting`) and the
/// committed result (`data`, `meta`, `error`) are set by the controller.
/// `first_page`, `is_empty` and `page_data` are derived from them and are
/// recomputed after every mutation, so they can only be read.
#[derive(Debug, Clone)]
pub struct TableState {
    pub(crate) page: usize,
    pub(crate) page_size: usize,
    first_page: bool,
    pub(crate) is_loading: bool,
    is_empty: bool,
    pub(crate) data: Arc<[Row]>,
    pub(crate) meta: Params,
    pub(crate) error: Option<TableError>,
    pub(crate) filters: Params,
    pub(crate) unapplied_filters: Params,
    pub(crate) sorting: Params,
    page_data: Vec<Row>,
    pub(crate) selected: Vec<Row>,
    pub(crate) search: String,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            first_page: true,
            is_loading: false,
            is_empty: true,
            data: Vec::new().into(),
            meta: Params::new(),
            error: None,
            filters: Params::new(),
            unapplied_filters: Params::new(),
            sorting: Params::new(),
            page_data: Vec::new(),
            selected: Vec::new(),
            search: String::new(),
        }
    }
}

impl TableState {
    /// Refreshes the derived fields from `data`, `page` and `page_size`.
    pub(crate) fn recompute(&mut self) {
        self.first_page = self.page == 0;
        self.is_empty = self.data.is_empty();
        self.page_data = page_window(&self.data, self.page, self.page_size).to_vec();
    }

    /// Zero-based index of the current page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Number of rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns `true` on the first page.
    pub fn first_page(&self) -> bool {
        self.first_page
    }

    /// Returns `true` while a fetch for the current query is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Returns `true` if the current result set has no rows.
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// The full result set for the current query.
    pub fn data(&self) -> &[Row] {
        &self.data
    }

    /// Metadata of the last committed response.
    pub fn meta(&self) -> &Params {
        &self.meta
    }

    /// The last fetch failure, if the latest fetch failed.
    pub fn error(&self) -> Option<&TableError> {
        self.error.as_ref()
    }

    /// Applied filters.
    pub fn filters(&self) -> &Params {
        &self.filters
    }

    /// Pending filter edits that have not been applied yet.
    pub fn unapplied_filters(&self) -> &Params {
        &self.unapplied_filters
    }

    /// Applied sort specification.
    pub fn sorting(&self) -> &Params {
        &self.sorting
    }

    /// The rows of the current page.
    pub fn page_data(&self) -> &[Row] {
        &self.page_data
    }

    /// Selected rows.
    pub fn selected(&self) -> &[Row] {
        &self.selected
    }

    /// Current search term.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Returns `true` if a row with the same identity is selected.
    pub fn is_selected(&self, row: &Row) -> bool {
        self.selected.iter().any(|s| s.same_id(row))
    }

    /// Number of pages needed to show `data` at the current page size.
    pub fn page_count(&self) -> usize {
        self.data.len().div_ceil(self.page_size.max(1))
    }

    /// Returns `true` if there is a page after the current one.
    pub fn has_next_page(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    /// Returns the query parameters a fetch for this state would use.
    pub fn query(&self) -> TableQuery {
        TableQuery {
            page: self.page,
            page_size: self.page_size,
            search: self.search.clone(),
            filters: self.filters.clone(),
            sorting: self.sorting.clone(),
            meta: self.meta.clone(),
        }
    }
}

/// Returns `data[page * page_size .. page * page_size + page_size]`, clamped to `data`.
pub fn page_window(data: &[Row], page: usize, page_size: usize) -> &[Row] {
    let start = page.saturating_mul(page_size).min(data.len());
    let end = start.saturating_add(page_size).min(data.len());
    &data[start..end]
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rows(n: usize) -> Vec<Row> {
        (0..n).map(|i| Row::new(json!({ "id": i }))).collect()
    }

    #[test]
    fn test_defaults() {
        let state = TableState::default();
        assert_eq!(state.page(), 0);
        assert_eq!(state.page_size(), 10);
        assert!(state.first_page());
        assert!(state.is_empty());
        assert!(!state.is_loading());
        assert!(state.page_data().is_empty());
    }

    #[test]
    fn test_page_window_middle_and_tail() {
        let data = rows(25);
        assert_eq!(page_window(&data, 1, 10), &data[10..20]);
        assert_eq!(page_window(&data, 2, 10), &data[20..25]);
        assert!(page_window(&data, 3, 10).is_empty());
    }

    #[test]
    fn test_page_window_zero_size() {
        let data = rows(5);
        assert!(page_window(&data, 0, 0).is_empty());
    }

    #[test]
    fn test_recompute_derives_fields() {
        let mut state = TableState::default();
        state.data = rows(12).into();
        state.page = 1;
        state.recompute();

        assert!(!state.first_page());
        assert!(!state.is_empty());
        assert_eq!(state.page_data().len(), 2);
        assert_eq!(state.page_count(), 2);
        assert!(!state.has_next_page());
    }

    #[test]
    fn test_is_selected_matches_by_id() {
        let mut state = TableState::default();
        state.selected = vec![Row::new(json!({ "id": 3, "title": "old" }))];

        assert!(state.is_selected(&Row::new(json!({ "id": 3, "title": "new" }))));
        assert!(!state.is_selected(&Row::new(json!({ "id": 4 }))));
    }
}

//! Cached view-state snapshot

use std::sync::Arc;

use crate::model::Params;
use crate::model::Row;
use crate::model::TableState;

/// An immutable snapshot of a committed query result.
///
/// Selection, sorting and errors are not captured. Restoring an entry keeps
/// the current selection and clears any error.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    data: Arc<[Row]>,
    first_page: bool,
    is_empty: bool,
    is_loading: bool,
    page_data: Vec<Row>,
    unapplied_filters: Params,
    meta: Params,
    page: usize,
    page_size: usize,
    search: String,
    filters: Params,
}

impl CacheEntry {
    /// Captures the cacheable fields of `state`.
    pub fn capture(state: &TableState) -> Self {
        Self {
            data: Arc::clone(&state.data),
            first_page: state.first_page(),
            is_empty: state.is_empty(),
            is_loading: state.is_loading(),
            page_data: state.page_data().to_vec(),
            unapplied_filters: state.unapplied_filters.clone(),
            meta: state.meta.clone(),
            page: state.page,
            page_size: state.page_size,
            search: state.search.clone(),
            filters: state.filters.clone(),
        }
    }

    /// Writes the entry back into `state`.
    ///
    /// Only the captured fields are touched; derived fields are recomputed
    /// from the restored data.
    pub(crate) fn restore(&self, state: &mut TableState) {
        state.data = Arc::clone(&self.data);
        state.is_loading = self.is_loading;
        state.unapplied_filters = self.unapplied_filters.clone();
        state.meta = self.meta.clone();
        state.page = self.page;
        state.page_size = self.page_size;
        state.search = self.search.clone();
        state.filters = self.filters.clone();
        state.error = None;
        state.recompute();
    }

    /// The cached result set.
    pub fn data(&self) -> &[Row] {
        &self.data
    }

    /// The cached page slice.
    pub fn page_data(&self) -> &[Row] {
        &self.page_data
    }

    /// The cached response metadata.
    pub fn meta(&self) -> &Params {
        &self.meta
    }

    /// Page index at capture time.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Page size at capture time.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Search term at capture time.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Applied filters at capture time.
    pub fn filters(&self) -> &Params {
        &self.filters
    }

    /// Pending filter edits at capture time.
    pub fn unapplied_filters(&self) -> &Params {
        &self.unapplied_filters
    }

    /// Whether the captured page was the first one.
    pub fn first_page(&self) -> bool {
        self.first_page
    }

    /// Whether the captured result set was empty.
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Loading flag at capture time; `false` for entries written by commits.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}

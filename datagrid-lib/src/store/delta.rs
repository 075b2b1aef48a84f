//! Partial state updates produced by setters.

use crate::cache::InstanceKey;
use crate::cache::KeyInput;
use crate::model::Params;
use crate::model::TableState;

/// The fields a setter wants to change.
#[derive(Debug, Clone, Default)]
pub(crate) struct StateDelta {
    page: Option<usize>,
    page_size: Option<usize>,
    search: Option<String>,
    sorting: Option<Params>,
    filters: Option<Params>,
    unapplied_filters: Option<Params>,
    clear_data: bool,
}

impl StateDelta {
    pub(crate) fn search(search: String) -> Self {
        Self {
            search: Some(search),
            page: Some(0),
            ..Default::default()
        }
    }

    pub(crate) fn page(page: usize) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    pub(crate) fn page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    pub(crate) fn sorting(sorting: Params) -> Self {
        Self {
            sorting: Some(sorting),
            ..Default::default()
        }
    }

    pub(crate) fn filters(filters: Params, clear_data: bool) -> Self {
        Self {
            unapplied_filters: Some(filters.clone()),
            filters: Some(filters),
            page: Some(0),
            clear_data,
            ..Default::default()
        }
    }

    /// Key input of the state this delta would produce.
    pub(crate) fn preview<'a>(
        &'a self,
        state: &'a TableState,
        instance_key: &'a InstanceKey,
    ) -> KeyInput<'a> {
        KeyInput {
            page: self.page.unwrap_or(state.page),
            page_size: self.page_size.unwrap_or(state.page_size),
            search: self.search.as_deref().unwrap_or(&state.search),
            filters: self.filters.as_ref().unwrap_or(&state.filters),
            sorting: self.sorting.as_ref().unwrap_or(&state.sorting),
            instance_key,
        }
    }

    /// Merges the delta into `state`.
    ///
    /// `clear_data` only takes effect when `with_data` is set: a cache hit
    /// restores its own rows, a miss empties the table while loading.
    pub(crate) fn apply(self, state: &mut TableState, with_data: bool) {
        if let Some(page) = self.page {
            state.page = page;
        }
        if let Some(page_size) = self.page_size {
            state.page_size = page_size;
        }
        if let Some(search) = self.search {
            state.search = search;
        }
        if let Some(sorting) = self.sorting {
            state.sorting = sorting;
        }
        if let Some(filters) = self.filters {
            state.filters = filters;
        }
        if let Some(unapplied_filters) = self.unapplied_filters {
            state.unapplied_filters = unapplied_filters;
        }
        if with_data && self.clear_data {
            state.data = Vec::new().into();
        }
    }
}

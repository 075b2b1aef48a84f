//! Table state store
//!
//! [`TableController`] owns the table state and exposes the setters. Every
//! setter that affects the query computes a delta and routes it through one
//! update path: derive the key of the resulting state, restore it from the
//! cache when possible, otherwise mark the table as loading and fetch.

mod cell;
mod config;
mod delta;
mod selection;

pub use config::*;

pub(crate) use cell::StateCell;

use std::sync::Arc;

use crate::cache::CacheKeyFn;
use crate::cache::InstanceKey;
use crate::cache::ResultCache;
use crate::fetch::Debouncer;
use crate::fetch::FetchRequest;
use crate::fetch::Fetcher;
use crate::fetch::RequestCoordinator;
use crate::model::Params;
use crate::model::Row;
use crate::model::TableState;
use crate::resolution::Resolution;
use crate::view::Subscription;
use crate::view::TableView;
use delta::StateDelta;

/// How a cache miss is turned into a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    /// Fetch right away.
    Immediate,
    /// Fetch after the search debounce window.
    Debounced,
    /// Skip the cache lookup and fetch right away.
    Refresh,
}

/// The state controller of one table.
///
/// Cheap to clone; clones share the same state, cache and fetch pipeline, so
/// a clone is also the setter handle given to renderers. Setters that may
/// fetch spawn onto the current Tokio runtime and must be called from
/// within one.
///
/// # Example
///
/// ```
/// use datagrid_lib::fetch::{BoxError, RawResult};
/// use datagrid_lib::model::TableQuery;
/// use datagrid_lib::store::{TableConfig, TableController, TableProps};
/// use serde_json::json;
///
/// async fn fetch_todos(_query: TableQuery) -> Result<RawResult, BoxError> {
///     let todos = (0..25).map(|id| json!({ "id": id, "done": id % 2 == 0 })).collect();
///     Ok(RawResult::from(serde_json::Value::Array(todos)))
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let table = TableController::new(fetch_todos, TableConfig::default());
/// table.initialize(TableProps::default());
///
/// let state = table.idle().await;
/// assert_eq!(state.data().len(), 25);
/// assert_eq!(state.page_data().len(), 10);
/// assert_eq!(state.meta().get("count"), Some(&json!(25)));
///
/// table.set_page(2);
/// let state = table.idle().await;
/// assert_eq!(state.page_data().len(), 5);
/// # }
/// ```
#[derive(Clone)]
pub struct TableController {
    inner: Arc<TableControllerInner>,
}

struct TableControllerInner {
    state: Arc<StateCell>,
    cache: Arc<ResultCache>,
    coordinator: Arc<RequestCoordinator>,
    search: Debouncer<FetchRequest>,
    cache_key: Arc<dyn CacheKeyFn>,
    instance_key: InstanceKey,
}

impl TableController {
    /// Creates a controller with default state and an empty cache.
    ///
    /// Nothing is fetched until [`initialize`](Self::initialize) is called.
    pub fn new<F: Fetcher + 'static>(fetcher: F, config: TableConfig) -> Self {
        let TableConfig {
            cache_key,
            on_error,
            search_wait,
        } = config;

        let state = Arc::new(StateCell::new(TableState::default()));
        let cache = Arc::new(ResultCache::new());
        let coordinator = Arc::new(RequestCoordinator::new(
            Arc::new(fetcher),
            Arc::clone(&state),
            Arc::clone(&cache),
            on_error,
        ));

        let search = {
            let coordinator = Arc::clone(&coordinator);
            Debouncer::new(search_wait, move |request: FetchRequest| {
                let coordinator = Arc::clone(&coordinator);
                async move {
                    if coordinator.is_current(request.ticket) {
                        coordinator.execute(request).await;
                    } else {
                        log::trace!("search request {} superseded before firing", request.ticket);
                    }
                }
            })
        };

        Self {
            inner: Arc::new(TableControllerInner {
                state,
                cache,
                coordinator,
                search,
                cache_key,
                instance_key: InstanceKey::generate(),
            }),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Seeds the state from `props` and performs the initial fetch.
    ///
    /// The applied filters also become the pending filter buffer.
    pub fn initialize(&self, props: TableProps) -> Resolution {
        let TableProps {
            page_size,
            filters,
            selected,
            ..
        } = props;

        self.inner.state.mutate(|state| {
            state.page_size = page_size.max(1);
            state.unapplied_filters = filters.clone();
            state.filters = filters;
            state.selected = selected;
        });
        self.handle_update(StateDelta::default(), Dispatch::Immediate)
    }

    /// Reconciles the state with changed external props.
    ///
    /// A selection with a different set of row ids is adopted without
    /// fetching. With `auto_apply_filters`, changed filters are applied as a
    /// new filter set and the stale rows are cleared. Returns the resolution
    /// of the filter update, if one happened.
    pub fn on_external_props_changed(&self, prev: &TableProps, next: &TableProps) -> Option<Resolution> {
        if !selection::same_selection(&next.selected, &prev.selected) {
            let selected = next.selected.clone();
            self.inner.state.mutate(|state| state.selected = selected);
        }

        if next.auto_apply_filters && next.filters != prev.filters {
            return Some(self.set_filters(next.filters.clone(), true));
        }
        None
    }

    // =========================================================================
    // Query setters
    // =========================================================================

    /// Sets the search term and returns to the first page.
    ///
    /// The fetch is debounced; rapid calls result in one fetch for the last
    /// term.
    pub fn set_search(&self, search: impl Into<String>) -> Resolution {
        self.handle_update(StateDelta::search(search.into()), Dispatch::Debounced)
    }

    /// Moves to `page`.
    pub fn set_page(&self, page: usize) -> Resolution {
        self.handle_update(StateDelta::page(page), Dispatch::Immediate)
    }

    /// Changes the number of rows per page. Zero is treated as one.
    pub fn set_page_size(&self, page_size: usize) -> Resolution {
        self.handle_update(StateDelta::page_size(page_size.max(1)), Dispatch::Immediate)
    }

    /// Replaces the sort specification.
    pub fn set_sorting(&self, sorting: Params) -> Resolution {
        self.handle_update(StateDelta::sorting(sorting), Dispatch::Immediate)
    }

    /// Applies `filters`, resets the pending buffer to them and returns to the
    /// first page.
    ///
    /// With `clear_data`, the current rows are dropped while the new result
    /// loads.
    pub fn set_filters(&self, filters: Params, clear_data: bool) -> Resolution {
        self.handle_update(StateDelta::filters(filters, clear_data), Dispatch::Immediate)
    }

    /// Applies the pending filter buffer.
    pub fn apply_filters(&self) -> Resolution {
        let filters = self.inner.state.read(|state| state.unapplied_filters.clone());
        self.set_filters(filters, false)
    }

    /// Clears the cache and fetches the current query again.
    pub fn refresh(&self) -> Resolution {
        self.inner.cache.clear();
        self.handle_update(StateDelta::default(), Dispatch::Refresh)
    }

    // =========================================================================
    // Local setters
    // =========================================================================

    /// Edits the pending filter buffer. Never fetches.
    pub fn set_unapplied_filters(&self, filters: Params) {
        self.inner.state.mutate(|state| state.unapplied_filters = filters);
    }

    /// Replaces the selection. Never fetches.
    pub fn set_selected(&self, selected: Vec<Row>) {
        self.inner.state.mutate(|state| state.selected = selected);
    }

    /// Selects every row of the current result set, or deselects them if they
    /// are all selected already. Never fetches.
    ///
    /// With `group`, selected rows without a group label are tagged with it.
    pub fn toggle_select_all(&self, group: Option<&str>) {
        self.inner.state.mutate(|state| {
            state.selected = selection::toggle_all(&state.data, &state.selected, group);
        });
    }

    /// Drops every cached result without fetching.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Returns the current state.
    pub fn snapshot(&self) -> Arc<TableState> {
        self.inner.state.snapshot()
    }

    /// Returns the current state together with this controller as the setter
    /// handle.
    pub fn view(&self) -> TableView {
        TableView::new(self.snapshot(), self.clone())
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.inner.state.subscribe(), self.clone())
    }

    /// Waits until no fetch is loading and returns the settled state.
    pub async fn idle(&self) -> Arc<TableState> {
        let mut rx = self.inner.state.subscribe();
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => Arc::clone(&state),
            Err(_) => self.snapshot(),
        }
    }

    /// Returns the result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.inner.cache
    }

    /// Returns the key that salts this controller's cache keys.
    pub fn instance_key(&self) -> &InstanceKey {
        &self.inner.instance_key
    }

    // =========================================================================
    // Update pipeline
    // =========================================================================

    fn handle_update(&self, delta: StateDelta, dispatch: Dispatch) -> Resolution {
        let inner = &self.inner;

        let request = inner.state.mutate(|state| {
            let key = inner
                .cache_key
                .cache_key(&delta.preview(state, &inner.instance_key));
            // A new ticket supersedes whatever is in flight, hit or miss
            let ticket = inner.coordinator.next_ticket();

            let cached = match dispatch {
                Dispatch::Refresh => None,
                Dispatch::Immediate | Dispatch::Debounced => inner.cache.get(&key),
            };

            match cached {
                Some(entry) => {
                    log::debug!("cache hit for {key}");
                    entry.restore(state);
                    delta.apply(state, false);
                    None
                }
                None => {
                    log::debug!("cache miss for {key}, request {ticket}");
                    delta.apply(state, true);
                    state.is_loading = true;
                    Some(FetchRequest {
                        query: state.query(),
                        key,
                        ticket,
                    })
                }
            }
        });

        match (request, dispatch) {
            (None, _) => {
                inner.search.cancel();
                Resolution::Cached
            }
            (Some(request), Dispatch::Debounced) => {
                inner.search.trigger(request);
                Resolution::Scheduled
            }
            (Some(request), Dispatch::Immediate | Dispatch::Refresh) => {
                inner.search.cancel();
                inner.coordinator.issue(request);
                Resolution::Fetching
            }
        }
    }
}

impl std::fmt::Debug for TableController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableController")
            .field("instance_key", &self.inner.instance_key)
            .field("cached", &self.inner.cache.len())
            .finish_non_exhaustive()
    }
}

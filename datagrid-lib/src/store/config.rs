//! Controller configuration and external props

use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheKey;
use crate::cache::CacheKeyFn;
use crate::cache::KeyInput;
use crate::cache::Sha256KeyDeriver;
use crate::error::TableError;
use crate::model::DEFAULT_PAGE_SIZE;
use crate::model::Params;
use crate::model::Row;

/// Default quiet window before a search is fetched.
pub const DEFAULT_SEARCH_WAIT: Duration = Duration::from_millis(300);

/// Callback invoked with every fetch failure that reaches the table.
pub type ErrorObserver = Arc<dyn Fn(&TableError) + Send + Sync>;

/// Construction-time settings of a [`TableController`](super::TableController).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagrid_lib::store::TableConfig;
///
/// let config = TableConfig::default()
///     .with_search_wait(Duration::from_millis(500))
///     .with_on_error(|err| eprintln!("table failed: {err}"));
/// ```
#[derive(Clone)]
pub struct TableConfig {
    pub(crate) cache_key: Arc<dyn CacheKeyFn>,
    pub(crate) on_error: ErrorObserver,
    pub(crate) search_wait: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            cache_key: Arc::new(Sha256KeyDeriver),
            on_error: Arc::new(log_error),
            search_wait: DEFAULT_SEARCH_WAIT,
        }
    }
}

impl TableConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cache key derivation with a closure.
    ///
    /// See [`CacheKeyFn`] for what the closure may call.
    pub fn with_cache_key<F>(mut self, f: F) -> Self
    where
        F: Fn(&KeyInput<'_>) -> CacheKey + Send + Sync + 'static,
    {
        self.cache_key = Arc::new(f);
        self
    }

    /// Replaces the cache key derivation with a [`CacheKeyFn`] implementation.
    pub fn with_key_deriver(mut self, deriver: impl CacheKeyFn + 'static) -> Self {
        self.cache_key = Arc::new(deriver);
        self
    }

    /// Sets the error observer.
    ///
    /// Default: log through `log::error!`.
    pub fn with_on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&TableError) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(f);
        self
    }

    /// Sets the debounce window for search.
    ///
    /// Default: 300 ms
    pub fn with_search_wait(mut self, wait: Duration) -> Self {
        self.search_wait = wait;
        self
    }
}

impl std::fmt::Debug for TableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableConfig")
            .field("search_wait", &self.search_wait)
            .finish_non_exhaustive()
    }
}

fn log_error(err: &TableError) {
    log::error!("table fetch failed: {err}");
}

/// Externally supplied table inputs.
///
/// Seeded into the state by
/// [`initialize`](super::TableController::initialize) and compared by
/// [`on_external_props_changed`](super::TableController::on_external_props_changed).
#[derive(Debug, Clone, PartialEq)]
pub struct TableProps {
    /// Initial rows per page.
    ///
    /// Default: 10
    pub page_size: usize,
    /// Initial applied filters.
    pub filters: Params,
    /// Initial selection.
    pub selected: Vec<Row>,
    /// Apply filters from new props automatically.
    ///
    /// Default: `false`
    pub auto_apply_filters: bool,
}

impl Default for TableProps {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            filters: Params::new(),
            selected: Vec::new(),
            auto_apply_filters: false,
        }
    }
}

impl TableProps {
    /// Creates props with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the applied filters.
    pub fn with_filters(mut self, filters: Params) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the selection.
    pub fn with_selected(mut self, selected: Vec<Row>) -> Self {
        self.selected = selected;
        self
    }

    /// Enables or disables auto-applying filters from props.
    pub fn with_auto_apply_filters(mut self, enabled: bool) -> Self {
        self.auto_apply_filters = enabled;
        self
    }
}

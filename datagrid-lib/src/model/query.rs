//! Query parameters handed to the fetcher.

use serde::Deserialize;
use serde::Serialize;

use super::Params;

/// The query parameters of a table at the moment a fetch is issued.
///
/// This is what the injected [`Fetcher`](crate::fetch::Fetcher) receives. The
/// fetcher is expected to return the full result set for `search`, `filters`
/// and `sorting`; the controller slices the current page out of it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableQuery {
    /// Zero-based page index.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Free-text search term.
    pub search: String,
    /// Applied filters.
    pub filters: Params,
    /// Applied sort specification.
    pub sorting: Params,
    /// Metadata of the last committed response.
    pub meta: Params,
}

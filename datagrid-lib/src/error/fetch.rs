//! Fetch failure wrapper

use std::sync::Arc;

/// Boxed error returned by a [`Fetcher`](crate::fetch::Fetcher).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The injected fetcher rejected.
///
/// Wraps the fetcher's own error so it can be shared between state snapshots
/// and the error observer. Displays exactly like the wrapped error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{inner}")]
pub struct FetchError {
    inner: Arc<dyn std::error::Error + Send + Sync>,
}

impl FetchError {
    /// Wraps a fetcher error.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self {
            inner: Arc::from(error.into()),
        }
    }

    /// Returns the error produced by the fetcher.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }
}

impl From<BoxError> for FetchError {
    fn from(error: BoxError) -> Self {
        Self {
            inner: Arc::from(error),
        }
    }
}

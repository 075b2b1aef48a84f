//! Table error type

use super::FetchError;
use super::ShapeError;

/// Errors surfaced through [`TableState::error`](crate::model::TableState::error)
/// and the error observer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TableError {
    /// The response data was not a sequence.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// The fetcher rejected.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl TableError {
    /// Returns `true` if the fetched data had the wrong shape.
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }

    /// Returns `true` if the fetcher itself failed.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

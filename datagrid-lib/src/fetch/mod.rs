//! Fetching and request coordination
//!
//! The [`Fetcher`] trait is the seam to the data source. Responses come back
//! as a [`RawResult`], which is normalized into rows and metadata before
//! being committed by the [`RequestCoordinator`].

mod coordinator;
mod debounce;

pub use coordinator::*;
pub use debounce::*;

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

pub use crate::error::BoxError;
use crate::error::ShapeError;
use crate::model::Params;
use crate::model::Row;
use crate::model::TableQuery;
use crate::model::is_truthy;

/// Data source for a table.
///
/// Receives the query parameters and returns the full result set for them,
/// either bare or together with metadata. Failures are reported through the
/// returned `Result`; they are logged, stored on the table and passed to the
/// error observer.
///
/// Any `Fn(TableQuery) -> impl Future<Output = Result<RawResult, BoxError>>`
/// closure implements this trait.
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::fetch::{BoxError, Fetcher, RawResult};
/// use datagrid_lib::model::TableQuery;
///
/// struct Todos {
///     http: reqwest::Client,
/// }
///
/// #[async_trait::async_trait]
/// impl Fetcher for Todos {
///     async fn fetch(&self, query: TableQuery) -> Result<RawResult, BoxError> {
///         let body: serde_json::Value = self
///             .http
///             .get("https://jsonplaceholder.typicode.com/todos")
///             .query(&[("q", query.search.as_str())])
///             .send()
///             .await?
///             .json()
///             .await?;
///         Ok(RawResult::from(body))
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the result set for `query`.
    async fn fetch(&self, query: TableQuery) -> Result<RawResult, BoxError>;
}

#[async_trait]
impl<F, Fut> Fetcher for F
where
    F: Fn(TableQuery) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RawResult, BoxError>> + Send + 'static,
{
    async fn fetch(&self, query: TableQuery) -> Result<RawResult, BoxError> {
        self(query).await
    }
}

/// A response as returned by a [`Fetcher`], before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    /// `{ "data": [...], "meta": {...} }`.
    Explicit {
        /// The result set; must be an array.
        data: Value,
        /// Response metadata.
        meta: Params,
    },
    /// A bare result set; metadata is synthesized as `{ "count": len }`.
    Bare(Value),
}

impl RawResult {
    /// Creates a bare result from rows.
    pub fn rows(rows: Vec<Row>) -> Self {
        Self::Bare(Value::Array(rows.into_iter().map(Row::into_value).collect()))
    }

    /// Creates an explicit result from rows and metadata.
    pub fn with_meta(rows: Vec<Row>, meta: Params) -> Self {
        Self::Explicit {
            data: Value::Array(rows.into_iter().map(Row::into_value).collect()),
            meta,
        }
    }

    /// Validates the shape and splits the result into rows and metadata.
    pub fn normalize(self) -> Result<FetchedData, ShapeError> {
        match self {
            Self::Explicit { data, meta } => Ok(FetchedData {
                rows: into_rows(data)?,
                meta,
            }),
            Self::Bare(data) => {
                let rows = into_rows(data)?;
                let mut meta = Params::new();
                meta.insert("count".to_string(), Value::from(rows.len()));
                Ok(FetchedData { rows, meta })
            }
        }
    }
}

impl From<Value> for RawResult {
    /// Treats an object with a truthy `data` and an object `meta` as explicit;
    /// anything else is a bare result set.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut body)
                if body.get("data").is_some_and(is_truthy)
                    && body.get("meta").is_some_and(Value::is_object) =>
            {
                let data = body.remove("data").unwrap_or(Value::Null);
                let meta = match body.remove("meta") {
                    Some(Value::Object(meta)) => meta,
                    _ => Params::new(),
                };
                Self::Explicit { data, meta }
            }
            other => Self::Bare(other),
        }
    }
}

impl From<Vec<Row>> for RawResult {
    fn from(rows: Vec<Row>) -> Self {
        Self::rows(rows)
    }
}

/// A validated response.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedData {
    /// The full result set.
    pub rows: Vec<Row>,
    /// Response metadata.
    pub meta: Params,
}

fn into_rows(data: Value) -> Result<Vec<Row>, ShapeError> {
    match data {
        Value::Array(items) => Ok(items.into_iter().map(Row::from).collect()),
        other => Err(ShapeError::of(&other)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bare_array_synthesizes_count() {
        let fetched = RawResult::from(json!([{ "id": 1 }, { "id": 2 }]))
            .normalize()
            .unwrap();
        assert_eq!(fetched.rows.len(), 2);
        assert_eq!(fetched.meta.get("count"), Some(&json!(2)));
    }

    #[test]
    fn test_explicit_result_keeps_meta() {
        let fetched = RawResult::from(json!({
            "data": [{ "id": 1 }],
            "meta": { "count": 120, "source": "api" }
        }))
        .normalize()
        .unwrap();
        assert_eq!(fetched.rows.len(), 1);
        assert_eq!(fetched.meta.get("count"), Some(&json!(120)));
        assert_eq!(fetched.meta.get("source"), Some(&json!("api")));
    }

    #[test]
    fn test_explicit_empty_data() {
        let raw = RawResult::from(json!({ "data": [], "meta": { "count": 0 } }));
        assert!(matches!(raw, RawResult::Explicit { .. }));
        let fetched = raw.normalize().unwrap();
        assert!(fetched.rows.is_empty());
        assert_eq!(fetched.meta.get("count"), Some(&json!(0)));
    }

    #[test]
    fn test_object_without_meta_is_rejected() {
        let err = RawResult::from(json!({ "data": [{ "id": 1 }] }))
            .normalize()
            .unwrap_err();
        assert_eq!(err.received(), "object");
    }

    #[test]
    fn test_explicit_non_array_data_is_rejected() {
        let err = RawResult::from(json!({ "data": "rows", "meta": {} }))
            .normalize()
            .unwrap_err();
        assert_eq!(err.received(), "string");
    }

    #[test]
    fn test_null_is_rejected() {
        let err = RawResult::from(json!(null)).normalize().unwrap_err();
        assert_eq!(err.received(), "null");
    }

    #[test]
    fn test_rows_constructor() {
        let raw = RawResult::from(vec![Row::new(json!({ "id": 1 }))]);
        assert_eq!(raw, RawResult::Bare(json!([{ "id": 1 }])));
        assert_eq!(RawResult::rows(Vec::new()).normalize().unwrap().meta.get("count"), Some(&json!(0)));
    }

    #[test]
    fn test_with_meta_keeps_given_count() {
        let mut meta = Params::new();
        meta.insert("count".into(), json!(40));
        let fetched = RawResult::with_meta(vec![Row::new(json!({ "id": 1 }))], meta)
            .normalize()
            .unwrap();
        assert_eq!(fetched.rows.len(), 1);
        assert_eq!(fetched.meta.get("count"), Some(&json!(40)));
    }
}

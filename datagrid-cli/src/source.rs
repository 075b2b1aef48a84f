//! A fetcher answering queries from rows loaded into memory.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use datagrid_lib::fetch::BoxError;
use datagrid_lib::fetch::Fetcher;
use datagrid_lib::fetch::RawResult;
use datagrid_lib::model::Params;
use datagrid_lib::model::Row;
use datagrid_lib::model::TableQuery;
use serde_json::Value;

/// Rows read from a JSON file, searched, filtered and sorted per query.
#[derive(Debug, Clone)]
pub struct JsonSource {
    rows: Arc<Vec<Value>>,
}

impl JsonSource {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows: Arc::new(rows),
        }
    }

    /// Loads a bare array or the `data` array of an explicit result.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let body: Value = serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        let rows = match body {
            Value::Array(rows) => rows,
            Value::Object(mut body) => match body.remove("data") {
                Some(Value::Array(rows)) => rows,
                _ => anyhow::bail!("{} has no `data` array", path.display()),
            },
            _ => anyhow::bail!("{} must hold an array of rows", path.display()),
        };
        log::info!("loaded {} rows from {}", rows.len(), path.display());
        Ok(Self::new(rows))
    }

    fn select(&self, query: &TableQuery) -> Vec<Value> {
        let needle = query.search.to_lowercase();
        let mut rows: Vec<Value> = self
            .rows
            .iter()
            .filter(|row| needle.is_empty() || matches_search(row, &needle))
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|(field, expected)| row.get(field) == Some(expected))
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            query
                .sorting
                .iter()
                .map(|(field, direction)| {
                    let ordering = compare(a.get(field), b.get(field));
                    if direction.as_str() == Some("desc") {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        rows
    }
}

#[async_trait]
impl Fetcher for JsonSource {
    async fn fetch(&self, query: TableQuery) -> Result<RawResult, BoxError> {
        let rows = self.select(&query);
        log::debug!(
            "query search={:?} filters={} sorting={} matched {} rows",
            query.search,
            query.filters.len(),
            query.sorting.len(),
            rows.len()
        );

        let mut meta = Params::new();
        meta.insert("count".to_string(), Value::from(rows.len()));
        meta.insert("total".to_string(), Value::from(self.rows.len()));
        Ok(RawResult::with_meta(rows.into_iter().map(Row::from).collect(), meta))
    }
}

fn matches_search(row: &Value, needle: &str) -> bool {
    match row {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|item| matches_search(item, needle)),
        Value::Object(fields) => fields.values().any(|value| matches_search(value, needle)),
        _ => false,
    }
}

/// Orders missing < null < bool < number < string; other values compare equal.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn source() -> JsonSource {
        JsonSource::new(vec![
            json!({ "id": 1, "title": "Write docs", "done": true }),
            json!({ "id": 2, "title": "Fix bug", "done": false }),
            json!({ "id": 3, "title": "Review docs", "done": false }),
        ])
    }

    fn ids(rows: &[Value]) -> Vec<u64> {
        rows.iter().filter_map(|r| r["id"].as_u64()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = TableQuery {
            search: "DOCS".into(),
            ..Default::default()
        };
        assert_eq!(ids(&source().select(&query)), vec![1, 3]);
    }

    #[test]
    fn test_filters_match_exactly() {
        let mut query = TableQuery::default();
        query.filters.insert("done".into(), json!(false));
        assert_eq!(ids(&source().select(&query)), vec![2, 3]);
    }

    #[test]
    fn test_sorting_descending() {
        let mut query = TableQuery::default();
        query.sorting.insert("title".into(), json!("desc"));
        assert_eq!(ids(&source().select(&query)), vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn test_fetch_reports_matched_and_total() {
        let query = TableQuery {
            search: "docs".into(),
            ..Default::default()
        };
        let fetched = source().fetch(query).await.unwrap().normalize().unwrap();
        assert_eq!(fetched.rows.len(), 2);
        assert_eq!(fetched.meta.get("count"), Some(&json!(2)));
        assert_eq!(fetched.meta.get("total"), Some(&json!(3)));
    }
}

//! Shared helpers for controller integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use datagrid_lib::error::TableError;
use datagrid_lib::fetch::BoxError;
use datagrid_lib::fetch::Fetcher;
use datagrid_lib::fetch::RawResult;
use datagrid_lib::model::Params;
use datagrid_lib::model::Row;
use datagrid_lib::model::TableQuery;
use serde_json::Value;
use serde_json::json;

/// What the mock fetcher answers for one query.
pub struct Reply {
    delay: Duration,
    result: Result<Value, String>,
}

impl Reply {
    pub fn ok(value: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(value),
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(message.to_string()),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = dyn Fn(&TableQuery) -> Reply + Send + Sync;

/// Fetcher that records every query and answers from a closure.
///
/// Clones share the call log, so a test can keep one and hand the other to
/// the controller.
#[derive(Clone)]
pub struct MockFetcher {
    calls: Arc<Mutex<Vec<TableQuery>>>,
    responder: Arc<Responder>,
}

impl MockFetcher {
    pub fn new(responder: impl Fn(&TableQuery) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        }
    }

    /// Always answers with `n` numbered rows.
    pub fn numbered(n: usize) -> Self {
        Self::new(move |_| Reply::ok(numbered(n)))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<TableQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<TableQuery> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, query: TableQuery) -> Result<RawResult, BoxError> {
        let reply = (self.responder)(&query);
        self.calls.lock().unwrap().push(query);

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        match reply.result {
            Ok(value) => Ok(RawResult::from(value)),
            Err(message) => Err(message.into()),
        }
    }
}

/// A JSON array of rows `{ "id": 0 } .. { "id": n - 1 }`.
pub fn numbered(n: usize) -> Value {
    Value::Array((0..n).map(|id| json!({ "id": id })).collect())
}

/// Rows tagged with the page they were fetched for.
pub fn rows_for_page(page: usize, n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| json!({ "id": page * 100 + i, "page": page }))
            .collect(),
    )
}

pub fn row(id: u64) -> Row {
    Row::new(json!({ "id": id }))
}

pub fn ids(rows: &[Row]) -> Vec<u64> {
    rows.iter().filter_map(|r| r.id().and_then(Value::as_u64)).collect()
}

pub fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

/// Collects the messages passed to an error observer.
#[derive(Clone, Default)]
pub struct ErrorLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl ErrorLog {
    pub fn observer(&self) -> impl Fn(&TableError) + Send + Sync + 'static {
        let messages = Arc::clone(&self.messages);
        move |err: &TableError| messages.lock().unwrap().push(err.to_string())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

//! Cache key derivation

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use chrono::Utc;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::model::Params;

/// Identifier of a memoized query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a key from any string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Per-controller salt mixed into every cache key.
///
/// Generated once per controller from the creation time, plus a process-wide
/// sequence so two controllers created in the same microsecond still differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceKey(String);

impl InstanceKey {
    /// Generates a fresh instance key.
    pub fn generate() -> Self {
        static SEQUENCE: AtomicU64 = AtomicU64::new(0);

        let created = Utc::now().timestamp_micros();
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{created:x}-{sequence:x}"))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The query fields that identify a cached result.
///
/// Selection, unapplied filters, data, metadata and errors are not part of
/// the key.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInput<'a> {
    /// Zero-based page index.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Search term.
    pub search: &'a str,
    /// Applied filters.
    pub filters: &'a Params,
    /// Applied sort specification.
    pub sorting: &'a Params,
    /// The owning controller's instance key.
    pub instance_key: &'a InstanceKey,
}

/// Maps query fields to a cache key.
///
/// Implementations must be deterministic. Any
/// `Fn(&KeyInput<'_>) -> CacheKey` closure implements this trait, which lets
/// callers partition the cache by domain rules (for example, ignoring a
/// filter field that the backend does not use).
///
/// The key is derived while the table's state lock is held, so the update
/// and its ticket stay atomic. A key function may read
/// [`TableController::snapshot`](crate::store::TableController::snapshot),
/// which does not take that lock, but must not call setters on the same
/// table.
///
/// # Example
///
/// ```
/// use datagrid_lib::cache::{CacheKey, CacheKeyFn, KeyInput};
///
/// // Every page of a search shares a key: the fetcher returns the full set.
/// let by_search = |input: &KeyInput<'_>| {
///     CacheKey::new(format!("{}:{}", input.instance_key.as_str(), input.search))
/// };
/// # fn assert_key_fn(_: &dyn CacheKeyFn) {}
/// # assert_key_fn(&by_search);
/// ```
pub trait CacheKeyFn: Send + Sync {
    /// Derives the cache key for `input`.
    fn cache_key(&self, input: &KeyInput<'_>) -> CacheKey;
}

impl<F> CacheKeyFn for F
where
    F: Fn(&KeyInput<'_>) -> CacheKey + Send + Sync,
{
    fn cache_key(&self, input: &KeyInput<'_>) -> CacheKey {
        self(input)
    }
}

/// Default key derivation: SHA-256 over the canonical JSON of the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256KeyDeriver;

impl CacheKeyFn for Sha256KeyDeriver {
    fn cache_key(&self, input: &KeyInput<'_>) -> CacheKey {
        // String keys and plain values only, serialization cannot fail
        let bytes = serde_json::to_vec(input).expect("key input should serialize to JSON");
        let digest = Sha256::digest(&bytes);
        CacheKey(format!("{digest:x}"))
    }
}

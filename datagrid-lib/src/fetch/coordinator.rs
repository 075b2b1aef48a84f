//! Fetch lifecycle: issue, staleness check, commit.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use super::FetchedData;
use super::Fetcher;
use crate::cache::CacheEntry;
use crate::cache::CacheKey;
use crate::cache::ResultCache;
use crate::error::FetchError;
use crate::error::TableError;
use crate::model::TableQuery;
use crate::store::ErrorObserver;
use crate::store::StateCell;

/// Sequence number of an issued request.
///
/// Every state transition that changes which result should be on screen
/// takes a new ticket; only the holder of the latest ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Returns the raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fetch waiting to be executed.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Query parameters passed to the fetcher.
    pub query: TableQuery,
    /// Cache key the result is stored under.
    pub key: CacheKey,
    /// Ticket taken when the request was created.
    pub ticket: Ticket,
}

/// Runs fetches and commits their results into table state.
///
/// Completions may arrive in any order. A response is committed only if its
/// ticket is still the latest one handed out; anything older is dropped
/// without touching state or cache.
pub struct RequestCoordinator {
    fetcher: Arc<dyn Fetcher>,
    state: Arc<StateCell>,
    cache: Arc<ResultCache>,
    on_error: ErrorObserver,
    latest: AtomicU64,
}

impl RequestCoordinator {
    pub(crate) fn new(
        fetcher: Arc<dyn Fetcher>,
        state: Arc<StateCell>,
        cache: Arc<ResultCache>,
        on_error: ErrorObserver,
    ) -> Self {
        Self {
            fetcher,
            state,
            cache,
            on_error,
            latest: AtomicU64::new(0),
        }
    }

    /// Hands out the next ticket, superseding every earlier one.
    ///
    /// Called with the state lock held so tickets and commits are ordered.
    pub(crate) fn next_ticket(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns the most recently issued ticket.
    pub fn latest(&self) -> Ticket {
        Ticket(self.latest.load(Ordering::SeqCst))
    }

    /// Returns `true` if no newer ticket has been issued since `ticket`.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest() == ticket
    }

    /// Spawns `request` as a background task.
    pub fn issue(self: &Arc<Self>, request: FetchRequest) {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            coordinator.execute(request).await;
        });
    }

    /// Fetches, validates and commits `request`.
    pub async fn execute(&self, request: FetchRequest) {
        let FetchRequest { query, key, ticket } = request;
        log::debug!("request {ticket}: fetching page {} (key {key})", query.page);

        let outcome = match self.fetcher.fetch(query).await {
            Ok(raw) => raw.normalize().map_err(TableError::from),
            Err(err) => Err(TableError::Fetch(FetchError::from(err))),
        };

        match outcome {
            Ok(fetched) => self.commit(key, ticket, fetched),
            Err(err) => self.fail(ticket, err),
        }
    }

    fn commit(&self, key: CacheKey, ticket: Ticket, fetched: FetchedData) {
        let FetchedData { rows, meta } = fetched;
        let committed = self.state.mutate_if(|state| {
            if !self.is_current(ticket) {
                return None;
            }
            state.data = rows.into();
            state.meta = meta;
            state.is_loading = false;
            state.error = None;
            state.recompute();
            self.cache.put(key.clone(), CacheEntry::capture(state));
            Some(())
        });

        match committed {
            Some(()) => log::debug!("request {ticket}: committed and cached under {key}"),
            None => log::debug!("request {ticket}: discarded stale response"),
        }
    }

    fn fail(&self, ticket: Ticket, err: TableError) {
        let stored = self.state.mutate_if(|state| {
            if !self.is_current(ticket) {
                return None;
            }
            state.error = Some(err.clone());
            state.is_loading = false;
            Some(())
        });

        match stored {
            // Observer runs outside the state lock; it may call back into the table
            Some(()) => (self.on_error)(&err),
            None => log::debug!("request {ticket}: discarded stale failure: {err}"),
        }
    }
}

impl std::fmt::Debug for RequestCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCoordinator")
            .field("latest", &self.latest())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::fetch::BoxError;
    use crate::fetch::RawResult;
    use crate::model::TableState;

    fn coordinator<F: Fetcher + 'static>(fetcher: F) -> (Arc<RequestCoordinator>, Arc<Mutex<Vec<String>>>) {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        let on_error: ErrorObserver = Arc::new(move |err: &TableError| {
            sink.lock().unwrap().push(err.to_string());
        });
        let coordinator = RequestCoordinator::new(
            Arc::new(fetcher),
            Arc::new(StateCell::new(TableState::default())),
            Arc::new(ResultCache::new()),
            on_error,
        );
        (Arc::new(coordinator), errors)
    }

    fn request(coordinator: &RequestCoordinator, key: &str) -> FetchRequest {
        FetchRequest {
            query: TableQuery::default(),
            key: CacheKey::new(key),
            ticket: coordinator.next_ticket(),
        }
    }

    async fn rows(_query: TableQuery) -> Result<RawResult, BoxError> {
        Ok(RawResult::from(json!([{ "id": 1 }, { "id": 2 }])))
    }

    async fn rejects(_query: TableQuery) -> Result<RawResult, BoxError> {
        Err("backend down".into())
    }

    async fn scalar(_query: TableQuery) -> Result<RawResult, BoxError> {
        Ok(RawResult::from(json!(17)))
    }

    #[test]
    fn test_tickets_are_monotonic() {
        let (coordinator, _) = coordinator(rows);
        let first = coordinator.next_ticket();
        let second = coordinator.next_ticket();
        assert!(second > first);
        assert_eq!(second.get(), first.get() + 1);
        assert!(coordinator.is_current(second));
        assert!(!coordinator.is_current(first));
    }

    #[tokio::test]
    async fn test_commit_updates_state_and_cache() {
        let (coordinator, errors) = coordinator(rows);
        let req = request(&coordinator, "k");
        coordinator.execute(req).await;

        let state = coordinator.state.snapshot();
        assert_eq!(state.data().len(), 2);
        assert_eq!(state.meta().get("count"), Some(&json!(2)));
        assert!(coordinator.cache.contains(&CacheKey::new("k")));
        assert!(errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (coordinator, _) = coordinator(rows);
        let stale = request(&coordinator, "old");
        let _newer = coordinator.next_ticket();
        coordinator.execute(stale).await;

        assert!(coordinator.state.snapshot().data().is_empty());
        assert!(coordinator.cache.is_empty());
    }

    #[tokio::test]
    async fn test_rejection_is_observed_and_stored() {
        let (coordinator, errors) = coordinator(rejects);
        let req = request(&coordinator, "k");
        coordinator.execute(req).await;

        let state = coordinator.state.snapshot();
        assert_eq!(state.error().map(ToString::to_string), Some("backend down".into()));
        assert!(coordinator.cache.is_empty());
        assert_eq!(*errors.lock().unwrap(), vec!["backend down".to_string()]);
    }

    #[tokio::test]
    async fn test_shape_error_is_reported() {
        let (coordinator, errors) = coordinator(scalar);
        let req = request(&coordinator, "k");
        coordinator.execute(req).await;

        let state = coordinator.state.snapshot();
        assert!(state.error().is_some_and(TableError::is_shape));
        assert_eq!(
            *errors.lock().unwrap(),
            vec!["Invalid data provided. Expected array, but got number".to_string()]
        );
    }

    #[tokio::test]
    async fn test_error_is_stored_before_observer_runs() {
        let state = Arc::new(StateCell::new(TableState::default()));
        let seen = Arc::new(Mutex::new(None));
        let on_error: ErrorObserver = {
            let state = Arc::clone(&state);
            let seen = Arc::clone(&seen);
            Arc::new(move |_: &TableError| {
                let snapshot = state.snapshot();
                *seen.lock().unwrap() = Some((
                    snapshot.error().map(ToString::to_string),
                    snapshot.is_loading(),
                ));
            })
        };
        state.mutate(|state| state.is_loading = true);
        let coordinator = RequestCoordinator::new(
            Arc::new(rejects),
            Arc::clone(&state),
            Arc::new(ResultCache::new()),
            on_error,
        );

        let req = request(&coordinator, "k");
        coordinator.execute(req).await;

        assert_eq!(
            *seen.lock().unwrap(),
            Some((Some("backend down".to_string()), false))
        );
    }

    #[tokio::test]
    async fn test_stale_failure_is_not_observed() {
        let (coordinator, errors) = coordinator(rejects);
        let stale = request(&coordinator, "k");
        let _newer = coordinator.next_ticket();
        coordinator.execute(stale).await;

        assert!(coordinator.state.snapshot().error().is_none());
        assert!(errors.lock().unwrap().is_empty());
    }
}

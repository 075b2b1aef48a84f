//! Trailing-edge debouncing for async operations.

use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

type Operation<A> = Arc<dyn Fn(A) -> BoxFuture<'static, ()> + Send + Sync>;

/// Coalesces bursts of triggers into one trailing call.
///
/// Each [`trigger`](Self::trigger) cancels the pending call and schedules a
/// new one `wait` later, so the operation only runs with the arguments of the
/// last trigger once the caller has been quiet for a full window. Once the
/// operation starts it runs to completion as its own task; later triggers
/// never cancel it.
///
/// Triggering spawns onto the current Tokio runtime.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagrid_lib::fetch::Debouncer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let debouncer = Debouncer::new(Duration::from_millis(300), |term: String| async move {
///     println!("searching for {term}");
/// });
///
/// debouncer.trigger("r".to_string());
/// debouncer.trigger("ru".to_string());
/// debouncer.trigger("rust".to_string()); // only this one runs
/// # }
/// ```
pub struct Debouncer<A> {
    wait: Duration,
    op: Operation<A>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    /// Creates a debouncer that runs `op` after `wait` of quiet.
    pub fn new<F, Fut>(wait: Duration, op: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            wait,
            op: Arc::new(move |args| op(args).boxed()),
            pending: Mutex::new(None),
        }
    }

    /// Schedules the operation with `args`, replacing any pending call.
    pub fn trigger(&self, args: A) {
        let op = Arc::clone(&self.op);
        let wait = self.wait;

        let mut pending = self.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        log::trace!("debounce: scheduling call in {wait:?}");
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            // Detached so a later abort can't cut the operation short
            tokio::spawn(op(args));
        }));
    }
}

impl<A> Debouncer<A> {
    /// Drops the pending call, if any.
    ///
    /// Returns `true` if a call was still waiting for its window to elapse.
    pub fn cancel(&self) -> bool {
        match self.lock().take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if a call is scheduled but has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.lock().as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Returns the configured quiet window.
    pub fn wait(&self) -> Duration {
        self.wait
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

impl<A> std::fmt::Debug for Debouncer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("wait", &self.wait)
            .field("pending", &self.is_pending())
            .finish()
    }
}

//! Lock-protected state with snapshot broadcast.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use tokio::sync::watch;

use crate::model::TableState;

/// Owns the [`TableState`] and publishes a snapshot after every mutation.
///
/// Every mutation runs under one lock, recomputes the derived fields and
/// broadcasts the result to subscribers before the lock is released.
pub(crate) struct StateCell {
    state: Mutex<TableState>,
    tx: watch::Sender<Arc<TableState>>,
}

impl StateCell {
    pub(crate) fn new(state: TableState) -> Self {
        let (tx, _) = watch::channel(Arc::new(state.clone()));
        Self {
            state: Mutex::new(state),
            tx,
        }
    }

    /// Returns the last published snapshot.
    pub(crate) fn snapshot(&self) -> Arc<TableState> {
        Arc::clone(&self.tx.borrow())
    }

    /// Reads the live state under the lock.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&TableState) -> R) -> R {
        f(&self.lock())
    }

    /// Mutates the state and publishes the result.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut TableState) -> R) -> R {
        let mut state = self.lock();
        let out = f(&mut state);
        self.publish(&mut state);
        out
    }

    /// Mutates the state if `f` returns `Some`; nothing is published otherwise.
    ///
    /// `f` must leave the state untouched when it returns `None`.
    pub(crate) fn mutate_if<R>(&self, f: impl FnOnce(&mut TableState) -> Option<R>) -> Option<R> {
        let mut state = self.lock();
        let out = f(&mut state)?;
        self.publish(&mut state);
        Some(out)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<TableState>> {
        self.tx.subscribe()
    }

    fn publish(&self, state: &mut TableState) {
        state.recompute();
        self.tx.send_replace(Arc::new(state.clone()));
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

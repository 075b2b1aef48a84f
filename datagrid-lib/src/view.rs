//! Read-only views for rendering layers
//!
//! A renderer never touches the controller's state directly. It reads a
//! [`TableView`], which pairs an immutable snapshot with the setter handle,
//! and waits on a [`Subscription`] for the next one.

use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::watch;

use crate::model::TableState;
use crate::store::TableController;

/// An immutable state snapshot plus the setters of the table it came from.
///
/// Dereferences to [`TableState`].
///
/// # Example
///
/// ```ignore
/// let view = table.view();
/// for row in view.page_data() {
///     draw(row);
/// }
/// if view.has_next_page() {
///     view.actions().set_page(view.page() + 1);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TableView {
    state: Arc<TableState>,
    actions: TableController,
}

impl TableView {
    pub(crate) fn new(state: Arc<TableState>, actions: TableController) -> Self {
        Self { state, actions }
    }

    /// Returns the snapshot.
    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Returns the setter handle.
    pub fn actions(&self) -> &TableController {
        &self.actions
    }
}

impl Deref for TableView {
    type Target = TableState;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

/// A stream of views, one per state mutation.
///
/// Intermediate states may be skipped when several mutations happen between
/// two reads; the latest one is always delivered.
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<Arc<TableState>>,
    actions: TableController,
}

impl Subscription {
    pub(crate) fn new(rx: watch::Receiver<Arc<TableState>>, actions: TableController) -> Self {
        Self { rx, actions }
    }

    /// Returns the latest view and marks it as seen.
    pub fn current(&mut self) -> TableView {
        let state = Arc::clone(&self.rx.borrow_and_update());
        TableView::new(state, self.actions.clone())
    }

    /// Returns `true` if a mutation happened since the last view was taken.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Waits for the next mutation and returns the resulting view.
    ///
    /// Returns `None` once the table is gone.
    pub async fn changed(&mut self) -> Option<TableView> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }
}

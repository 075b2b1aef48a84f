//! Data table state controller
//!
//! Drives a paginated, searchable, filterable and sortable table on top of
//! an injected async fetch function. Results are memoized per query, rapid
//! searches are debounced, and out-of-order responses are dropped so only the
//! latest request ever reaches the screen. Rendering layers read immutable
//! snapshots and call setters; they never share state with the controller.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod model;
pub mod resolution;
pub mod store;
pub mod view;

pub use resolution::Resolution;
pub use store::TableConfig;
pub use store::TableController;
pub use store::TableProps;
pub use view::Subscription;
pub use view::TableView;

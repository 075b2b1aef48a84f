//! Table data model
//!
//! Rows, the query parameters handed to the fetcher, and the state record
//! owned by the controller.

mod query;
mod row;
mod state;

pub use query::*;
pub use row::*;
pub use state::*;

/// A JSON object used for filters, sort specifications and response metadata.
///
/// Backed by a sorted map, so key order never affects equality or cache keys.
pub type Params = serde_json::Map<String, serde_json::Value>;

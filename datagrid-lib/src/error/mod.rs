//! Error types

mod fetch;
mod shape;
mod table;

pub use fetch::*;
pub use shape::*;
pub use table::*;

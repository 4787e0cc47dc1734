//! SQLite persistence of the listening history.
//!
//! Six tables keyed by natural keys, loaded with insert-or-ignore semantics so
//! that re-running a sync over an overlapping time window changes nothing that
//! is already stored.

mod loader;
pub mod schema;

pub use loader::{Database, LoadReport, TableLoad};
pub use schema::{LOAD_ORDER, Record, Table};

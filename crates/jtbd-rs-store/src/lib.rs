//! Job statement persistence: record model, store contract and SQLite store.

pub mod error;
pub mod model;
pub mod sqlite;
pub mod store;

/// Store error type.
pub use error::StoreError;
/// Record model.
pub use model::{JobStatement, NewJobStatement, OwnerId, statement_key};
/// SQLite-backed store.
pub use sqlite::{SqliteJobStore, SqliteStoreOptions};
/// Store contract and lookup filters.
pub use store::{JobStore, RecordFilter};

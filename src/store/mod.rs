//! Store abstraction for the Windo catalog tables.
//!
//! The synchronizer only ever talks to the [`CatalogStore`] trait, so tests
//! can substitute the in-memory implementation for the SQLite one.

mod memory_store;
mod models;
mod schema;
mod sqlite_store;

pub use memory_store::MemoryCatalogStore;
pub use models::{RunStatus, SyncRun};
pub use schema::{add_column_if_missing, WINDO_VERSIONED_SCHEMAS};
pub use sqlite_store::SqliteCatalogStore;

use serde_json::Value;
use thiserror::Error;

/// Classified store failures surfaced by every fallible store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or the connection was lost.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A referential-integrity or uniqueness constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("store error: {0}")]
    Other(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;
        match &err {
            rusqlite::Error::SqliteFailure(e, _) => match e.code {
                ErrorCode::ConstraintViolation => {
                    StoreError::ConstraintViolation(err.to_string())
                }
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::DiskFull
                | ErrorCode::NotADatabase => StoreError::Unavailable(err.to_string()),
                _ => StoreError::Other(err.to_string()),
            },
            _ => StoreError::Other(err.to_string()),
        }
    }
}

/// Durable keyed storage for catalog tables.
///
/// Attribute values travel as `serde_json::Value`: strings, integers and
/// reals map to the corresponding SQL types, arrays and objects are stored
/// as serialized JSON text and decoded again on read.
pub trait CatalogStore: Send + Sync {
    /// Insert-or-update a single record keyed by `id`, overwriting all
    /// supplied attribute columns with the new values.
    fn upsert(&self, table: &str, id: &str, attributes: &[(String, Value)])
        -> Result<(), StoreError>;

    /// Plain insert; fails with [`StoreError::ConstraintViolation`] when a
    /// row with the same `id` already exists.
    fn insert(&self, table: &str, id: &str, attributes: &[(String, Value)])
        -> Result<(), StoreError>;

    /// Fetch the attribute columns of a row (everything but `id`), or
    /// `None` when the row is absent.
    fn get(&self, table: &str, id: &str) -> Result<Option<Vec<(String, Value)>>, StoreError>;

    /// All row ids of a table, sorted.
    fn ids(&self, table: &str) -> Result<Vec<String>, StoreError>;

    fn count(&self, table: &str) -> Result<usize, StoreError>;

    /// Delete every row of a table, returning the number removed.
    fn delete_all(&self, table: &str) -> Result<usize, StoreError>;

    // Sync run log
    fn record_run_start(&self, mode: &str) -> Result<i64, StoreError>;
    fn record_run_finish(
        &self,
        run_id: i64,
        status: RunStatus,
        error_message: Option<&str>,
    ) -> Result<(), StoreError>;
    fn recent_runs(&self, limit: usize) -> Result<Vec<SyncRun>, StoreError>;
}

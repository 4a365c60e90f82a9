//! Windo Catalog Sync Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog;
pub mod sqlite_persistence;
pub mod store;
pub mod sync;

// Re-export commonly used types for convenience
pub use catalog::{all_catalogs, Catalog, CatalogRecord, SeedCatalog, GIFT_DEPENDENTS};
pub use store::{
    CatalogStore, MemoryCatalogStore, RunStatus, SqliteCatalogStore, StoreError, SyncRun,
};
pub use sync::{sync_replace, sync_upsert, DependentSpec, SyncError, SyncReport};

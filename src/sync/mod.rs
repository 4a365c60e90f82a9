//! Catalog synchronizer.
//!
//! Converges a store table onto a hand-authored catalog. The safe path is
//! [`sync_upsert`]: one idempotent insert-or-update per record, rows not in
//! the catalog left alone. The destructive path is [`sync_replace`]: purge
//! dependents, purge the table, re-insert the catalog. Neither path wraps
//! the batch in a transaction; a full re-run is the recovery mechanism.

use crate::catalog::Catalog;
use crate::store::{CatalogStore, StoreError};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// A table holding non-owning references (foreign keys) into a catalog
/// table. During a replace sync every listed dependent is purged, in the
/// listed order, before the parent rows are deleted.
#[derive(Debug, Clone, Copy)]
pub struct DependentSpec {
    pub table: &'static str,
    pub parent_column: &'static str,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("catalog {table} contains duplicate id {id}")]
    DuplicateId { table: String, id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counters for one synchronized catalog, used for status lines.
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub table: String,
    pub records_written: usize,
    pub rows_deleted: usize,
    pub dependents_purged: usize,
}

fn ensure_unique_ids(catalog: &Catalog) -> Result<(), SyncError> {
    if let Some(id) = catalog.duplicate_id() {
        return Err(SyncError::DuplicateId {
            table: catalog.table().to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Additive sync: upsert every catalog record in sequence order.
///
/// Rows whose id is absent from the catalog are left untouched. Each
/// upsert is an independent statement; on failure the store may be
/// partially updated and the whole operation is safe to re-run.
pub fn sync_upsert(
    catalog: &Catalog,
    store: &dyn CatalogStore,
) -> Result<SyncReport, SyncError> {
    ensure_unique_ids(catalog)?;

    let mut report = SyncReport {
        table: catalog.table().to_string(),
        ..Default::default()
    };
    for record in catalog.records() {
        store.upsert(catalog.table(), record.id(), record.attributes())?;
        report.records_written += 1;
    }

    info!(
        "Upserted {} records into {}",
        report.records_written,
        catalog.table()
    );
    Ok(report)
}

/// Destructive sync: purge dependents and the target table, then insert
/// the catalog from scratch.
///
/// Afterwards the table contains exactly the catalog's ids and every
/// listed dependent is empty. Dependents are deleted before the parent
/// rows so referential-integrity constraints cannot fire. Not safely
/// interruptible: a failure between the delete and insert steps leaves
/// the table empty or partially populated, and the run must be repeated
/// to completion.
pub fn sync_replace(
    catalog: &Catalog,
    store: &dyn CatalogStore,
    dependents: &[DependentSpec],
) -> Result<SyncReport, SyncError> {
    ensure_unique_ids(catalog)?;

    let mut report = SyncReport {
        table: catalog.table().to_string(),
        ..Default::default()
    };

    for dependent in dependents {
        let purged = store.delete_all(dependent.table)?;
        report.dependents_purged += purged;
        info!(
            "Purged {} rows from {} ({}.{} -> {}.id)",
            purged,
            dependent.table,
            dependent.table,
            dependent.parent_column,
            catalog.table()
        );
    }

    report.rows_deleted = store.delete_all(catalog.table())?;
    info!(
        "Deleted {} stale rows from {}",
        report.rows_deleted,
        catalog.table()
    );

    for record in catalog.records() {
        store.insert(catalog.table(), record.id(), record.attributes())?;
        report.records_written += 1;
    }

    info!(
        "Re-inserted {} records into {}",
        report.records_written,
        catalog.table()
    );
    Ok(report)
}

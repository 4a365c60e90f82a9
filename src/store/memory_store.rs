//! In-memory catalog store.
//!
//! A fake implementation of [`CatalogStore`] backed by plain maps, for unit
//! tests of the synchronizer. It does not model foreign keys; constraint
//! behavior is covered by the SQLite store.

use super::models::{RunStatus, SyncRun};
use super::{CatalogStore, StoreError};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    tables: BTreeMap<String, BTreeMap<String, Vec<(String, Value)>>>,
    runs: Vec<SyncRun>,
}

#[derive(Default)]
pub struct MemoryCatalogStore {
    inner: Mutex<Inner>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn upsert(
        &self,
        table: &str,
        id: &str,
        attributes: &[(String, Value)],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .insert(id.to_string(), attributes.to_vec());
        Ok(())
    }

    fn insert(
        &self,
        table: &str,
        id: &str,
        attributes: &[(String, Value)],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let rows = inner.tables.entry(table.to_string()).or_default();
        if rows.contains_key(id) {
            return Err(StoreError::ConstraintViolation(format!(
                "duplicate id {} in table {}",
                id, table
            )));
        }
        rows.insert(id.to_string(), attributes.to_vec());
        Ok(())
    }

    fn get(&self, table: &str, id: &str) -> Result<Option<Vec<(String, Value)>>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tables
            .get(table)
            .and_then(|rows| rows.get(id))
            .cloned())
    }

    fn ids(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tables
            .get(table)
            .map(|rows| rows.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn count(&self, table: &str) -> Result<usize, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tables.get(table).map(|rows| rows.len()).unwrap_or(0))
    }

    fn delete_all(&self, table: &str) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let deleted = inner
            .tables
            .get_mut(table)
            .map(|rows| {
                let count = rows.len();
                rows.clear();
                count
            })
            .unwrap_or(0);
        Ok(deleted)
    }

    fn record_run_start(&self, mode: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.runs.len() as i64 + 1;
        inner.runs.push(SyncRun {
            id,
            mode: mode.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            status: RunStatus::Running,
            error_message: None,
        });
        Ok(id)
    }

    fn record_run_finish(
        &self,
        run_id: i64,
        status: RunStatus,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(run) = inner.runs.iter_mut().find(|run| run.id == run_id) {
            run.finished_at = Some(Utc::now());
            run.status = status;
            run.error_message = error_message.map(|s| s.to_string());
        }
        Ok(())
    }

    fn recent_runs(&self, limit: usize) -> Result<Vec<SyncRun>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.runs.iter().rev().take(limit).cloned().collect())
    }
}

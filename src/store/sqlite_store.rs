//! SQLite-backed catalog store.
//!
//! Opening a store creates the schema on a fresh database, or migrates and
//! validates the schema of an existing one, before any sync touches it.

use super::models::{RunStatus, SyncRun};
use super::schema::WINDO_VERSIONED_SCHEMAS;
use super::{CatalogStore, StoreError};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Debug)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let latest = WINDO_VERSIONED_SCHEMAS.last().unwrap();

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        // Brand new database - create the latest schema directly
        info!("Creating catalog db schema at version {}", latest.version);
        latest.create(conn)?;
        return Ok(());
    }

    if db_version < BASE_DB_VERSION as i64 {
        bail!(
            "Database has user_version {} and is not a Windo catalog database",
            db_version
        );
    }

    let mut current_version = (db_version - BASE_DB_VERSION as i64) as usize;
    if current_version < latest.version {
        let tx = conn.transaction()?;
        for schema in WINDO_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating catalog db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx).with_context(|| {
                    format!("Failed to run migration to version {}", schema.version)
                })?;
            }
            current_version = schema.version;
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    }

    latest
        .validate(conn)
        .context("Catalog database schema validation failed")?;
    Ok(())
}

/// Map an attribute value to its SQL representation. Arrays and objects
/// are stored as serialized JSON text.
fn to_sql_value(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as SqlValue;
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else {
                SqlValue::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Inverse of [`to_sql_value`]: text that parses as a JSON array or object
/// is decoded back into the composite value it was stored from.
fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).to_string();
            if text.starts_with('[') || text.starts_with('{') {
                if let Ok(parsed) = serde_json::from_str(&text) {
                    return parsed;
                }
            }
            Value::String(text)
        }
        ValueRef::Blob(_) => Value::Null,
    }
}

impl SqliteCatalogStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let path = db_path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            StoreError::Unavailable(format!("failed to open catalog database {:?}: {}", path, e))
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(format!("failed to open in-memory store: {}", e)))?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self, StoreError> {
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        migrate_if_needed(&mut conn).map_err(|e| StoreError::Other(format!("{:#}", e)))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn write_record(
        &self,
        table: &str,
        id: &str,
        attributes: &[(String, Value)],
        on_conflict_update: bool,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut columns = String::new();
        let mut placeholders = String::new();
        let mut assignments = String::new();
        for (index, (name, _)) in attributes.iter().enumerate() {
            columns.push_str(", ");
            columns.push_str(name);
            placeholders.push_str(&format!(", ?{}", index + 2));
            if index > 0 {
                assignments.push_str(", ");
            }
            assignments.push_str(&format!("{} = ?{}", name, index + 2));
        }

        let sql = if attributes.is_empty() {
            format!(
                "INSERT INTO {} (id) VALUES (?1) ON CONFLICT(id) DO NOTHING",
                table
            )
        } else if on_conflict_update {
            format!(
                "INSERT INTO {} (id{}) VALUES (?1{}) ON CONFLICT(id) DO UPDATE SET {}",
                table, columns, placeholders, assignments
            )
        } else {
            format!(
                "INSERT INTO {} (id{}) VALUES (?1{})",
                table, columns, placeholders
            )
        };

        let mut sql_params = vec![rusqlite::types::Value::Text(id.to_string())];
        sql_params.extend(attributes.iter().map(|(_, value)| to_sql_value(value)));
        conn.execute(&sql, params_from_iter(sql_params))?;
        Ok(())
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn upsert(
        &self,
        table: &str,
        id: &str,
        attributes: &[(String, Value)],
    ) -> Result<(), StoreError> {
        self.write_record(table, id, attributes, true)
    }

    fn insert(
        &self,
        table: &str,
        id: &str,
        attributes: &[(String, Value)],
    ) -> Result<(), StoreError> {
        self.write_record(table, id, attributes, false)
    }

    fn get(&self, table: &str, id: &str) -> Result<Option<Vec<(String, Value)>>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("SELECT * FROM {} WHERE id = ?1", table))?;
        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let row = stmt
            .query_row(params![id], |row| {
                let mut attributes = Vec::with_capacity(column_names.len().saturating_sub(1));
                for (index, name) in column_names.iter().enumerate() {
                    if name == "id" {
                        continue;
                    }
                    attributes.push((name.clone(), from_sql_value(row.get_ref(index)?)));
                }
                Ok(attributes)
            })
            .optional()?;
        Ok(row)
    }

    fn ids(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("SELECT id FROM {} ORDER BY id", table))?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    fn count(&self, table: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        Ok(count as usize)
    }

    fn delete_all(&self, table: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(&format!("DELETE FROM {}", table), [])?;
        Ok(deleted)
    }

    fn record_run_start(&self, mode: &str) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO sync_runs (mode, started_at, status) VALUES (?1, ?2, ?3)",
            params![mode, now, RunStatus::Running.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn record_run_finish(
        &self,
        run_id: i64,
        status: RunStatus,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE sync_runs SET finished_at = ?1, status = ?2, error_message = ?3 WHERE id = ?4",
            params![now, status.as_str(), error_message, run_id],
        )?;
        Ok(())
    }

    fn recent_runs(&self, limit: usize) -> Result<Vec<SyncRun>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, mode, started_at, finished_at, status, error_message
             FROM sync_runs ORDER BY started_at DESC, id DESC LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![limit as i64], |row| {
                let started_at_str: String = row.get("started_at")?;
                let finished_at_str: Option<String> = row.get("finished_at")?;
                let status_str: String = row.get("status")?;

                Ok(SyncRun {
                    id: row.get("id")?,
                    mode: row.get("mode")?,
                    started_at: DateTime::parse_from_rfc3339(&started_at_str)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                    finished_at: finished_at_str.and_then(|s| {
                        DateTime::parse_from_rfc3339(&s)
                            .map(|dt| dt.with_timezone(&Utc))
                            .ok()
                    }),
                    status: RunStatus::parse(&status_str).unwrap_or(RunStatus::Failed),
                    error_message: row.get("error_message")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn upsert_inserts_then_overwrites() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        let first = attrs(&[
            ("label", json!("Coins x10")),
            ("coins", json!(10)),
            ("weight", json!(40)),
            ("color", json!("#ffcc00")),
        ]);
        store.upsert("wheel_prizes", "coins-10", &first).unwrap();

        let mut second = first.clone();
        second[1].1 = json!(25);
        store.upsert("wheel_prizes", "coins-10", &second).unwrap();

        assert_eq!(store.count("wheel_prizes").unwrap(), 1);
        let row = store.get("wheel_prizes", "coins-10").unwrap().unwrap();
        assert_eq!(row, second);
    }

    #[test]
    fn insert_duplicate_is_constraint_violation() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        let fields = attrs(&[
            ("name", json!("North")),
            ("region", json!("amman")),
            ("active", json!(1)),
        ]);
        store.insert("agents", "agent-1", &fields).unwrap();
        let err = store.insert("agents", "agent-1", &fields).unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[test]
    fn json_features_round_trip() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        let fields = attrs(&[
            ("name", json!("VIP Monthly")),
            ("gems", json!(0)),
            ("price_usd", json!(9.99)),
            ("features", json!(["no_ads", "vip_badge", "room_priority"])),
            ("bonus_gems", json!(50)),
        ]);
        store.upsert("packages", "vip-monthly", &fields).unwrap();

        let row = store.get("packages", "vip-monthly").unwrap().unwrap();
        assert_eq!(row, fields);
    }

    #[test]
    fn deleting_referenced_gift_is_constraint_violation() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        store
            .upsert(
                "gifts",
                "rose-1",
                &attrs(&[
                    ("name", json!("Rose")),
                    ("name_ar", json!("وردة")),
                    ("price", json!(1)),
                    ("icon", json!("gifts/rose.png")),
                    ("rarity", json!("common")),
                ]),
            )
            .unwrap();
        store
            .insert(
                "gift_messages",
                "msg-1",
                &attrs(&[
                    ("sender_id", json!("u-1")),
                    ("recipient_id", json!("u-2")),
                    ("gift_id", json!("rose-1")),
                    ("message", json!("happy birthday")),
                    ("sent_at", json!("2026-01-01T00:00:00Z")),
                ]),
            )
            .unwrap();

        let err = store.delete_all("gifts").unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[test]
    fn run_log_records_start_and_finish() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        let run_id = store.record_run_start("sync").unwrap();
        store
            .record_run_finish(run_id, RunStatus::Completed, None)
            .unwrap();

        let runs = store.recent_runs(5).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, run_id);
        assert_eq!(runs[0].mode, "sync");
        assert_eq!(runs[0].status, RunStatus::Completed);
        assert!(runs[0].finished_at.is_some());
    }
}

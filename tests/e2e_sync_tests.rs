//! End-to-end sync scenarios over real SQLite databases.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use tempfile::tempdir;
use windo_catalog_sync::store::WINDO_VERSIONED_SCHEMAS;
use windo_catalog_sync::{
    all_catalogs, sync_replace, sync_upsert, Catalog, CatalogRecord, CatalogStore,
    SqliteCatalogStore, StoreError, SyncError, GIFT_DEPENDENTS,
};

fn attrs(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn gift_record(id: &str, price: i64) -> CatalogRecord {
    CatalogRecord::new(id)
        .attr("name", "Test Gift")
        .attr("name_ar", "هدية")
        .attr("price", price)
        .attr("icon", "gifts/test.png")
        .attr("rarity", "common")
}

fn as_map(row: Vec<(String, Value)>) -> BTreeMap<String, Value> {
    row.into_iter().collect()
}

fn table_snapshot(
    store: &dyn CatalogStore,
    table: &str,
) -> BTreeMap<String, BTreeMap<String, Value>> {
    store
        .ids(table)
        .unwrap()
        .into_iter()
        .map(|id| {
            let row = store.get(table, &id).unwrap().unwrap();
            (id, as_map(row))
        })
        .collect()
}

fn stale_gift(store: &dyn CatalogStore) {
    store
        .insert("gifts", "old-gift", gift_record("old-gift", 7).attributes())
        .unwrap();
}

fn gift_message(store: &dyn CatalogStore, id: &str, gift_id: &str) {
    store
        .insert(
            "gift_messages",
            id,
            &attrs(&[
                ("sender_id", json!("user-1")),
                ("recipient_id", json!("user-2")),
                ("gift_id", json!(gift_id)),
                ("message", json!("congrats!")),
                ("sent_at", json!("2026-02-14T12:00:00Z")),
            ]),
        )
        .unwrap();
}

#[test]
fn full_sync_converges_every_catalog() {
    let store = SqliteCatalogStore::open_in_memory().unwrap();

    for seed in all_catalogs() {
        sync_upsert(&seed.catalog, &store).unwrap();
    }

    for seed in all_catalogs() {
        let table = seed.catalog.table();
        assert_eq!(
            store.count(table).unwrap(),
            seed.catalog.records().len(),
            "row count mismatch for {}",
            table
        );
        for record in seed.catalog.records() {
            let row = store.get(table, record.id()).unwrap().unwrap();
            assert_eq!(
                as_map(row),
                record.attributes().iter().cloned().collect(),
                "attributes mismatch for {}.{}",
                table,
                record.id()
            );
        }
    }
}

#[test]
fn repeated_sync_is_idempotent() {
    let store = SqliteCatalogStore::open_in_memory().unwrap();

    for seed in all_catalogs() {
        sync_upsert(&seed.catalog, &store).unwrap();
    }
    let once: Vec<_> = all_catalogs()
        .iter()
        .map(|seed| table_snapshot(&store, seed.catalog.table()))
        .collect();

    for seed in all_catalogs() {
        sync_upsert(&seed.catalog, &store).unwrap();
    }
    let twice: Vec<_> = all_catalogs()
        .iter()
        .map(|seed| table_snapshot(&store, seed.catalog.table()))
        .collect();

    assert_eq!(once, twice);
}

#[test]
fn price_correction_updates_in_place() {
    let store = SqliteCatalogStore::open_in_memory().unwrap();

    let before = Catalog::new(
        "gifts",
        vec![gift_record("rose-1", 1), gift_record("heart-1", 2)],
    );
    sync_upsert(&before, &store).unwrap();

    let after = Catalog::new(
        "gifts",
        vec![gift_record("rose-1", 5), gift_record("heart-1", 2)],
    );
    sync_upsert(&after, &store).unwrap();

    assert_eq!(store.count("gifts").unwrap(), 2);
    let rose = as_map(store.get("gifts", "rose-1").unwrap().unwrap());
    assert_eq!(rose.get("price"), Some(&json!(5)));
    let heart = as_map(store.get("gifts", "heart-1").unwrap().unwrap());
    assert_eq!(heart.get("price"), Some(&json!(2)));
}

#[test]
fn upsert_preserves_stale_rows_replace_removes_them() {
    let store = SqliteCatalogStore::open_in_memory().unwrap();
    stale_gift(&store);

    let catalog = Catalog::new(
        "gifts",
        vec![gift_record("rose-1", 1), gift_record("heart-1", 2)],
    );

    sync_upsert(&catalog, &store).unwrap();
    assert!(store.get("gifts", "old-gift").unwrap().is_some());

    sync_replace(&catalog, &store, GIFT_DEPENDENTS).unwrap();
    assert!(store.get("gifts", "old-gift").unwrap().is_none());

    let mut expected: Vec<String> = catalog
        .records()
        .iter()
        .map(|r| r.id().to_string())
        .collect();
    expected.sort();
    assert_eq!(store.ids("gifts").unwrap(), expected);
}

#[test]
fn replace_with_dependents_declared_never_violates_constraints() {
    let store = SqliteCatalogStore::open_in_memory().unwrap();
    let catalog = Catalog::new("gifts", vec![gift_record("rose-1", 1)]);
    sync_upsert(&catalog, &store).unwrap();
    gift_message(&store, "msg-1", "rose-1");

    let report = sync_replace(&catalog, &store, GIFT_DEPENDENTS).unwrap();
    assert_eq!(report.dependents_purged, 1);
    assert_eq!(store.count("gift_messages").unwrap(), 0);
    assert_eq!(store.count("gifts").unwrap(), 1);
}

#[test]
fn replace_without_dependents_declared_hits_constraint() {
    let store = SqliteCatalogStore::open_in_memory().unwrap();
    let catalog = Catalog::new("gifts", vec![gift_record("rose-1", 1)]);
    sync_upsert(&catalog, &store).unwrap();
    gift_message(&store, "msg-1", "rose-1");

    // Deleting the parent rows while a message still references them is
    // exactly the failure the dependent ordering exists to prevent.
    let err = sync_replace(&catalog, &store, &[]).unwrap_err();
    assert!(matches!(
        err,
        SyncError::Store(StoreError::ConstraintViolation(_))
    ));

    // The dependent row is untouched and a corrected full retry succeeds.
    assert_eq!(store.count("gift_messages").unwrap(), 1);
    sync_replace(&catalog, &store, GIFT_DEPENDENTS).unwrap();
    assert_eq!(store.count("gift_messages").unwrap(), 0);
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("windo.db");

    {
        let store = SqliteCatalogStore::open(&db_path).unwrap();
        for seed in all_catalogs() {
            sync_upsert(&seed.catalog, &store).unwrap();
        }
    }

    let store = SqliteCatalogStore::open(&db_path).unwrap();
    for seed in all_catalogs() {
        assert_eq!(
            store.count(seed.catalog.table()).unwrap(),
            seed.catalog.records().len()
        );
    }
}

#[test]
fn v0_database_is_migrated_on_open() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("windo.db");

    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        WINDO_VERSIONED_SCHEMAS[0].create(&conn).unwrap();
    }

    // Opening migrates to the latest version; the v1 columns are now
    // available for the catalogs that use them.
    let store = SqliteCatalogStore::open(&db_path).unwrap();
    for seed in all_catalogs() {
        sync_upsert(&seed.catalog, &store).unwrap();
    }
    let rose = as_map(store.get("gifts", "rose-1").unwrap().unwrap());
    assert_eq!(rose.get("rarity"), Some(&json!("common")));
}

#[test]
fn opening_a_foreign_database_fails() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("other.db");

    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute("CREATE TABLE unrelated (id INTEGER PRIMARY KEY)", [])
            .unwrap();
    }

    let err = SqliteCatalogStore::open(&db_path).unwrap_err();
    assert!(matches!(err, StoreError::Other(_)));
}

#[test]
fn interrupted_replace_recovers_with_full_retry() {
    let store = SqliteCatalogStore::open_in_memory().unwrap();
    let catalog = Catalog::new(
        "gifts",
        vec![gift_record("rose-1", 1), gift_record("heart-1", 2)],
    );
    sync_upsert(&catalog, &store).unwrap();

    // Simulate a crash after the delete step of a replace: the table is
    // empty, no inserts have happened yet.
    store.delete_all("gift_messages").unwrap();
    store.delete_all("gifts").unwrap();
    assert_eq!(store.count("gifts").unwrap(), 0);

    // A full re-run converges regardless of the partial prior state.
    sync_replace(&catalog, &store, GIFT_DEPENDENTS).unwrap();
    assert_eq!(store.count("gifts").unwrap(), 2);
}

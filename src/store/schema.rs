//! SQLite schema definitions for the Windo catalog database.
//!
//! Version 0 is the original table shape; version 1 adds the gift rarity
//! tier and package bonus gems as optional columns.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};
use anyhow::Result;
use rusqlite::Connection;
use tracing::warn;

// =============================================================================
// Version 0 - catalog tables, gift messages, sync run log
// =============================================================================

const GIFTS_TABLE_V0: Table = Table {
    name: "gifts",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("name_ar", &SqlType::Text, non_null = true),
        sqlite_column!("price", &SqlType::Integer, non_null = true),
        sqlite_column!("icon", &SqlType::Text, non_null = true),
    ],
    indices: &[],
};

const GIFTS_FK: ForeignKey = ForeignKey {
    foreign_table: "gifts",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Restrict,
};

/// Gift messages hold a non-owning reference to a gift; a gift row cannot
/// be deleted while a message still points at it.
const GIFT_MESSAGES_TABLE_V0: Table = Table {
    name: "gift_messages",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("sender_id", &SqlType::Text, non_null = true),
        sqlite_column!("recipient_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "gift_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&GIFTS_FK)
        ),
        sqlite_column!("message", &SqlType::Text),
        sqlite_column!("sent_at", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_gift_messages_gift_id", "gift_id")],
};

const WHEEL_PRIZES_TABLE_V0: Table = Table {
    name: "wheel_prizes",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("label", &SqlType::Text, non_null = true),
        sqlite_column!("coins", &SqlType::Integer, non_null = true),
        sqlite_column!("weight", &SqlType::Integer, non_null = true),
        sqlite_column!("color", &SqlType::Text, non_null = true),
    ],
    indices: &[],
};

const AGENTS_TABLE_V0: Table = Table {
    name: "agents",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("region", &SqlType::Text, non_null = true),
        sqlite_column!("active", &SqlType::Integer, non_null = true),
    ],
    indices: &[],
};

const PACKAGES_TABLE_V0: Table = Table {
    name: "packages",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("gems", &SqlType::Integer, non_null = true),
        sqlite_column!("price_usd", &SqlType::Real, non_null = true),
        sqlite_column!("features", &SqlType::Text, non_null = true),
    ],
    indices: &[],
};

const SYNC_RUNS_TABLE_V0: Table = Table {
    name: "sync_runs",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true), // AUTOINCREMENT
        sqlite_column!("mode", &SqlType::Text, non_null = true),
        sqlite_column!("started_at", &SqlType::Text, non_null = true),
        sqlite_column!("finished_at", &SqlType::Text),
        sqlite_column!("status", &SqlType::Text, non_null = true),
        sqlite_column!("error_message", &SqlType::Text),
    ],
    indices: &[("idx_sync_runs_started", "started_at DESC")],
};

// =============================================================================
// Version 1 - gift rarity tier, package bonus gems
// =============================================================================

const GIFTS_TABLE_V1: Table = Table {
    name: "gifts",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("name_ar", &SqlType::Text, non_null = true),
        sqlite_column!("price", &SqlType::Integer, non_null = true),
        sqlite_column!("icon", &SqlType::Text, non_null = true),
        sqlite_column!("rarity", &SqlType::Text),
    ],
    indices: &[],
};

const PACKAGES_TABLE_V1: Table = Table {
    name: "packages",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("gems", &SqlType::Integer, non_null = true),
        sqlite_column!("price_usd", &SqlType::Real, non_null = true),
        sqlite_column!("features", &SqlType::Text, non_null = true),
        sqlite_column!("bonus_gems", &SqlType::Integer),
    ],
    indices: &[],
};

/// Add a column to a table only if it is not already there.
///
/// Re-running a migration that contains an already-applied column addition
/// is not an error: the step logs a warning and moves on.
pub fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    declaration: &str,
) -> Result<()> {
    let exists: bool = conn
        .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2",
            rusqlite::params![table, column],
            |_| Ok(true),
        )
        .unwrap_or(false);

    if exists {
        warn!(
            "Column {}.{} already present, skipping addition",
            table, column
        );
        return Ok(());
    }

    conn.execute(
        &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, declaration),
        [],
    )?;
    Ok(())
}

/// Migration from version 0 to version 1.
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    add_column_if_missing(conn, "gifts", "rarity", "TEXT")?;
    add_column_if_missing(conn, "packages", "bonus_gems", "INTEGER")?;
    Ok(())
}

pub const WINDO_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[
            GIFTS_TABLE_V0,
            GIFT_MESSAGES_TABLE_V0,
            WHEEL_PRIZES_TABLE_V0,
            AGENTS_TABLE_V0,
            PACKAGES_TABLE_V0,
            SYNC_RUNS_TABLE_V0,
        ],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[
            GIFTS_TABLE_V1,
            GIFT_MESSAGES_TABLE_V0,
            WHEEL_PRIZES_TABLE_V0,
            AGENTS_TABLE_V0,
            PACKAGES_TABLE_V1,
            SYNC_RUNS_TABLE_V0,
        ],
        migration: Some(migrate_v0_to_v1),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_create_at_latest_version_validates() {
        let conn = Connection::open_in_memory().unwrap();
        let latest = WINDO_VERSIONED_SCHEMAS.last().unwrap();
        latest.create(&conn).unwrap();
        latest.validate(&conn).unwrap();
    }

    #[test]
    fn migration_from_v0_reaches_latest_shape() {
        let conn = Connection::open_in_memory().unwrap();
        WINDO_VERSIONED_SCHEMAS[0].create(&conn).unwrap();

        migrate_v0_to_v1(&conn).unwrap();
        WINDO_VERSIONED_SCHEMAS.last().unwrap().validate(&conn).unwrap();
    }

    #[test]
    fn add_column_if_missing_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        WINDO_VERSIONED_SCHEMAS[0].create(&conn).unwrap();

        add_column_if_missing(&conn, "gifts", "rarity", "TEXT").unwrap();
        // Second application finds the column and skips it.
        add_column_if_missing(&conn, "gifts", "rarity", "TEXT").unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('gifts') WHERE name = 'rarity'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}

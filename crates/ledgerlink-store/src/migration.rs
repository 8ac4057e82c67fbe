//! SQLite schema migrations.
//!
//! Migrations are an ordered list of SQL batches. Version N is the schema
//! after applying the first N batches; applied versions are recorded in
//! `schema_migrations`.

use rusqlite::{params, Connection, Transaction};

use crate::error::{Result, StoreError};

/// Ordered schema steps. Entry `i` takes the schema to version `i + 1`.
const MIGRATIONS: &[&str] = &[
    // v1: one row per block, keyed by position in the chain.
    r#"
    CREATE TABLE blocks (
        "index" INTEGER PRIMARY KEY,      -- 0 for genesis, contiguous
        timestamp INTEGER NOT NULL,       -- creation time (Unix ms)
        transactions BLOB NOT NULL,       -- canonical CBOR array of transactions
        previous_hash BLOB NOT NULL,      -- 32 bytes, zero for genesis
        hash BLOB NOT NULL UNIQUE         -- 32 bytes, BLAKE3 of canonical content
    );
    "#,
];

/// Schema version this build writes.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring the schema up to [`CURRENT_VERSION`].
///
/// Idempotent. Refuses a database written by a newer build.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
    )?;

    let found = schema_version(conn)?;
    if found > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            found, CURRENT_VERSION
        )));
    }
    if found == CURRENT_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (step, sql) in MIGRATIONS.iter().enumerate().skip(found as usize) {
        apply(&tx, step as u32 + 1, sql)?;
    }
    tx.commit()?;

    Ok(())
}

/// Highest applied version, 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> Result<u32> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn apply(tx: &Transaction<'_>, version: u32, sql: &str) -> Result<()> {
    tx.execute_batch(sql)
        .map_err(|e| StoreError::Migration(format!("step {} failed: {}", version, e)))?;
    tx.execute(
        "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        params![version, unix_millis()],
    )?;
    tracing::info!(version, "applied schema migration");
    Ok(())
}

fn unix_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use ledgerlink_core::canonical::{decode_transactions, encode_transactions};
use ledgerlink_core::{Block, BlockHash};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

const SELECT_BLOCK: &str =
    r#"SELECT "index", timestamp, transactions, previous_hash, hash FROM blocks"#;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file (and its parent directory) and runs migrations if
    /// it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        tracing::info!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection from a worker thread.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&conn)?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| StoreError::Poisoned(format!("connection mutex: {}", e)))
}

/// Chain indices are stored in a signed INTEGER column.
fn sql_index(index: u64) -> Result<i64> {
    i64::try_from(index)
        .map_err(|_| StoreError::InvalidData(format!("index {} exceeds the sqlite range", index)))
}

fn sql_count(count: i64) -> Result<u64> {
    u64::try_from(count).map_err(|_| StoreError::InvalidData(format!("negative row count {}", count)))
}

// Helper to convert a row to Block
fn row_to_block(row: &rusqlite::Row<'_>) -> rusqlite::Result<Block> {
    let index: i64 = row.get(0)?;
    let timestamp: i64 = row.get(1)?;
    let transactions_cbor: Vec<u8> = row.get(2)?;
    let previous_hash: Vec<u8> = row.get(3)?;
    let hash: Vec<u8> = row.get(4)?;

    let index = u64::try_from(index).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, index))?;
    let previous_hash = column_hash(previous_hash, 3, "previous_hash")?;
    let hash = column_hash(hash, 4, "hash")?;

    // A row whose transactions no longer decode still occupies its slot;
    // validation reports it as a hash mismatch.
    match decode_transactions(&transactions_cbor) {
        Ok(transactions) => Ok(Block::from_parts(index, timestamp, transactions, previous_hash, hash)),
        Err(e) => {
            tracing::warn!(index, error = %e, "stored transactions are unreadable");
            Ok(Block::undecodable(index, timestamp, previous_hash, hash))
        }
    }
}

fn column_hash(bytes: Vec<u8>, column: usize, name: &str) -> rusqlite::Result<BlockHash> {
    BlockHash::try_from(bytes.as_slice())
        .map_err(|_| rusqlite::Error::InvalidColumnType(column, name.into(), Type::Blob))
}

#[async_trait]
impl Store for SqliteStore {
    async fn append_block(&self, block: &Block) -> Result<InsertResult> {
        if block.is_undecodable() {
            return Err(StoreError::Serialization(format!(
                "block {} has unreadable transactions",
                block.index()
            )));
        }
        let block = block.clone();

        self.run(move |conn| {
            let index = block.index();
            let row_index = sql_index(index)?;
            let tx = conn.transaction()?;

            let existing: Option<Vec<u8>> = tx
                .query_row(
                    r#"SELECT hash FROM blocks WHERE "index" = ?1"#,
                    params![row_index],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing) = existing {
                let existing = BlockHash::try_from(existing.as_slice()).map_err(|_| {
                    StoreError::InvalidData(format!("malformed hash at index {}", index))
                })?;
                if existing == *block.hash() {
                    return Ok(InsertResult::AlreadyExists);
                }
                return Ok(InsertResult::Conflict { existing });
            }

            let count: i64 = tx.query_row("SELECT COUNT(*) FROM blocks", [], |row| row.get(0))?;
            let count = sql_count(count)?;
            if index != count {
                return Err(StoreError::OutOfOrder {
                    expected: count,
                    got: index,
                });
            }

            let transactions = encode_transactions(block.transactions())
                .map_err(|e| StoreError::Serialization(e.to_string()))?;

            tx.execute(
                r#"INSERT INTO blocks ("index", timestamp, transactions, previous_hash, hash)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![
                    row_index,
                    block.timestamp(),
                    transactions,
                    block.previous_hash().0.as_slice(),
                    block.hash().0.as_slice(),
                ],
            )?;
            tx.commit()?;

            tracing::debug!(index, hash = %block.hash(), "block persisted");
            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn get_block(&self, hash: &BlockHash) -> Result<Option<Block>> {
        let hash = *hash;

        self.run(move |conn| {
            conn.query_row(
                &format!("{} WHERE hash = ?1", SELECT_BLOCK),
                params![hash.0.as_slice()],
                row_to_block,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get_block_at(&self, index: u64) -> Result<Option<Block>> {
        // No row can sit beyond the INTEGER range.
        let Ok(row_index) = i64::try_from(index) else {
            return Ok(None);
        };

        self.run(move |conn| {
            conn.query_row(
                &format!(r#"{} WHERE "index" = ?1"#, SELECT_BLOCK),
                params![row_index],
                row_to_block,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn all_blocks(&self) -> Result<Vec<Block>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(&format!(r#"{} ORDER BY "index""#, SELECT_BLOCK))?;
            let blocks = stmt
                .query_map([], row_to_block)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(blocks)
        })
        .await
    }

    async fn tip(&self) -> Result<Option<Block>> {
        self.run(|conn| {
            conn.query_row(
                &format!(r#"{} ORDER BY "index" DESC LIMIT 1"#, SELECT_BLOCK),
                [],
                row_to_block,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn block_count(&self) -> Result<u64> {
        self.run(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM blocks", [], |row| row.get(0))?;
            sql_count(count)
        })
        .await
    }
}

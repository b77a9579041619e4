//! SQLite storage adapter.
//!
//! Decimals are stored as text: SQLite's NUMERIC affinity would turn them
//! into floating point.

use crate::domain::error::PriceStoreError;
use crate::domain::price_record::{MAX_SYMBOL_LEN, PriceRecord};
use crate::ports::config_port::ConfigPort;
use crate::ports::storage_port::{StoragePort, UnitOfWork};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::warn;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn database_error(e: r2d2::Error) -> PriceStoreError {
    PriceStoreError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> PriceStoreError {
    PriceStoreError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn parse_pool_size(value: i64) -> Result<u32, PriceStoreError> {
    u32::try_from(value)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| PriceStoreError::ConfigInvalid {
            section: "sqlite".into(),
            key: "pool_size".into(),
            reason: format!("{value} is not a positive connection count"),
        })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PriceStoreError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| PriceStoreError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = parse_pool_size(config.get_int("sqlite", "pool_size")?.unwrap_or(4))?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(database_error)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, PriceStoreError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(database_error)?;

        Ok(Self { pool })
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, PriceStoreError> {
        self.pool.get().map_err(database_error)
    }
}

impl StoragePort for SqliteAdapter {
    fn initialize_schema(&self) -> Result<(), PriceStoreError> {
        let conn = self.connection()?;

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS price_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL CHECK (length(symbol) <= {MAX_SYMBOL_LEN}),
                trade_date TEXT NOT NULL,
                open TEXT NOT NULL,
                high TEXT NOT NULL,
                low TEXT NOT NULL,
                close TEXT NOT NULL,
                volume TEXT NOT NULL
            );"
        ))
        .map_err(query_error)?;

        Ok(())
    }

    fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>, PriceStoreError> {
        let conn = self.connection()?;
        conn.execute_batch("BEGIN").map_err(query_error)?;
        Ok(Box::new(SqliteUnitOfWork {
            conn,
            committed: false,
        }))
    }
}

/// Transaction on a pooled connection; rolls back on drop unless committed.
struct SqliteUnitOfWork {
    conn: PooledConnection<SqliteConnectionManager>,
    committed: bool,
}

impl UnitOfWork for SqliteUnitOfWork {
    fn insert_batch(&mut self, records: &[PriceRecord]) -> Result<(), PriceStoreError> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "INSERT INTO price_history (symbol, trade_date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .map_err(query_error)?;

        for record in records {
            stmt.execute(params![
                record.symbol,
                record.trade_date.format("%Y-%m-%d").to_string(),
                record.open.to_string(),
                record.high.to_string(),
                record.low.to_string(),
                record.close.to_string(),
                record.volume.to_string(),
            ])
            .map_err(query_error)?;
        }

        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<(), PriceStoreError> {
        self.conn.execute_batch("COMMIT").map_err(query_error)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for SqliteUnitOfWork {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                warn!("sqlite rollback failed: {e}");
            }
        }
    }
}

//! PostgreSQL storage adapter.

use crate::domain::error::PriceStoreError;
use crate::domain::price_record::{
    DECIMAL_SCALE, MAX_SYMBOL_LEN, PRICE_PRECISION, PriceRecord, VOLUME_PRECISION,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::storage_port::{StoragePort, UnitOfWork};
use postgres::{Client, NoTls};
use std::cell::{RefCell, RefMut};
use tracing::warn;

pub struct PostgresAdapter {
    client: RefCell<Client>,
}

fn query_error(e: postgres::Error) -> PriceStoreError {
    PriceStoreError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PriceStoreError> {
        // Try [postgres] connection_string first, fall back to [database] conninfo
        let connection_string = config
            .get_string("postgres", "connection_string")
            .or_else(|| config.get_string("database", "conninfo"))
            .ok_or_else(|| PriceStoreError::ConfigMissing {
                section: "postgres".into(),
                key: "connection_string".into(),
            })?;

        let client =
            Client::connect(&connection_string, NoTls).map_err(|e| PriceStoreError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client: RefCell::new(client),
        })
    }

    fn client(&self) -> Result<RefMut<'_, Client>, PriceStoreError> {
        self.client
            .try_borrow_mut()
            .map_err(|_| PriceStoreError::Database {
                reason: "connection already has an open unit of work".into(),
            })
    }
}

pub fn schema_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS price_history (
            id BIGSERIAL PRIMARY KEY,
            symbol VARCHAR({MAX_SYMBOL_LEN}) NOT NULL,
            trade_date DATE NOT NULL,
            open NUMERIC({PRICE_PRECISION}, {DECIMAL_SCALE}) NOT NULL,
            high NUMERIC({PRICE_PRECISION}, {DECIMAL_SCALE}) NOT NULL,
            low NUMERIC({PRICE_PRECISION}, {DECIMAL_SCALE}) NOT NULL,
            close NUMERIC({PRICE_PRECISION}, {DECIMAL_SCALE}) NOT NULL,
            volume NUMERIC({VOLUME_PRECISION}, {DECIMAL_SCALE}) NOT NULL
        )"
    )
}

impl StoragePort for PostgresAdapter {
    fn initialize_schema(&self) -> Result<(), PriceStoreError> {
        self.client()?
            .batch_execute(&schema_sql())
            .map_err(query_error)
    }

    fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>, PriceStoreError> {
        let mut client = self.client()?;
        client.batch_execute("BEGIN").map_err(query_error)?;
        Ok(Box::new(PostgresUnitOfWork {
            client,
            committed: false,
        }))
    }
}

/// Transaction on the adapter's connection; rolls back on drop unless committed.
struct PostgresUnitOfWork<'a> {
    client: RefMut<'a, Client>,
    committed: bool,
}

impl UnitOfWork for PostgresUnitOfWork<'_> {
    fn insert_batch(&mut self, records: &[PriceRecord]) -> Result<(), PriceStoreError> {
        let stmt = self
            .client
            .prepare(
                "INSERT INTO price_history (symbol, trade_date, open, high, low, close, volume) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .map_err(query_error)?;

        for record in records {
            self.client
                .execute(
                    &stmt,
                    &[
                        &record.symbol,
                        &record.trade_date,
                        &record.open,
                        &record.high,
                        &record.low,
                        &record.close,
                        &record.volume,
                    ],
                )
                .map_err(query_error)?;
        }

        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<(), PriceStoreError> {
        self.client.batch_execute("COMMIT").map_err(query_error)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PostgresUnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = self.client.batch_execute("ROLLBACK") {
                warn!("postgres rollback failed: {e}");
            }
        }
    }
}

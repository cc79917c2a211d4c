//! PostgreSQL metrics store.
//!
//! No pooling: every operation opens its own connection and drops it before
//! returning.

use crate::domain::error::QuotepollError;
use crate::domain::metrics_row::MetricsRow;
use crate::ports::store_port::MetricsStore;
use chrono::NaiveDateTime;
use postgres::types::ToSql;
use postgres::{Client, NoTls};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS symbols (
        id SERIAL PRIMARY KEY,
        symbol VARCHAR(20) UNIQUE NOT NULL
    );
    CREATE TABLE IF NOT EXISTS metrics (
        id SERIAL PRIMARY KEY,
        symbol VARCHAR(20),
        timestamp TIMESTAMP,
        price NUMERIC(10, 2),
        open NUMERIC(10, 2),
        high NUMERIC(10, 2),
        low NUMERIC(10, 2),
        close NUMERIC(10, 2),
        volume BIGINT,
        avg_volume NUMERIC(10, 2),
        ema NUMERIC(10, 2),
        vwap NUMERIC(10, 2)
    );
    CREATE INDEX IF NOT EXISTS idx_metrics_symbol_timestamp ON metrics(symbol, timestamp);";

pub struct PostgresAdapter {
    conninfo: String,
}

impl PostgresAdapter {
    pub fn new(conninfo: impl Into<String>) -> Self {
        Self {
            conninfo: conninfo.into(),
        }
    }

    fn connect(&self) -> Result<Client, QuotepollError> {
        Client::connect(&self.conninfo, NoTls).map_err(QuotepollError::database)
    }
}

impl MetricsStore for PostgresAdapter {
    fn initialize_schema(&self) -> Result<(), QuotepollError> {
        let mut client = self.connect()?;
        client.batch_execute(SCHEMA).map_err(QuotepollError::query)
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuotepollError> {
        let mut client = self.connect()?;
        let rows = client
            .query("SELECT symbol FROM symbols ORDER BY symbol", &[])
            .map_err(QuotepollError::query)?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    fn insert_metrics(&self, row: &MetricsRow) -> Result<(), QuotepollError> {
        let query = "INSERT INTO metrics \
                     (symbol, timestamp, price, open, high, low, close, volume, avg_volume, ema, vwap) \
                     VALUES ($1, $2, $3::float8, $4::float8, $5::float8, $6::float8, $7::float8, \
                             $8, $9::float8, $10::float8, $11::float8)";

        let params: &[&(dyn ToSql + Sync)] = &[
            &row.symbol,
            &row.timestamp,
            &row.price,
            &row.open,
            &row.high,
            &row.low,
            &row.close,
            &row.volume,
            &row.avg_volume,
            &row.ema,
            &row.vwap,
        ];

        let mut client = self.connect()?;
        client
            .execute(query, params)
            .map_err(QuotepollError::query)?;
        Ok(())
    }

    fn recent_metrics(&self, symbol: &str, limit: usize) -> Result<Vec<MetricsRow>, QuotepollError> {
        let query = "SELECT symbol, timestamp, \
                            price::float8, open::float8, high::float8, low::float8, close::float8, \
                            volume, avg_volume::float8, ema::float8, vwap::float8 \
                     FROM metrics \
                     WHERE symbol = $1 \
                     ORDER BY timestamp DESC, id DESC \
                     LIMIT $2";

        let limit = limit as i64;
        let mut client = self.connect()?;
        let rows = client
            .query(query, &[&symbol, &limit])
            .map_err(QuotepollError::query)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let timestamp: NaiveDateTime = row.get(1);
                MetricsRow {
                    symbol: row.get(0),
                    timestamp,
                    price: row.get(2),
                    open: row.get(3),
                    high: row.get(4),
                    low: row.get(5),
                    close: row.get(6),
                    volume: row.get(7),
                    avg_volume: row.get(8),
                    ema: row.get(9),
                    vwap: row.get(10),
                }
            })
            .collect())
    }
}

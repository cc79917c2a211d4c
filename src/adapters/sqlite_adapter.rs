//! SQLite metrics store.
//!
//! Mirrors the PostgreSQL schema with SQLite types. Each operation opens the
//! database file, uses the connection and closes it on return.

use crate::domain::error::QuotepollError;
use crate::domain::metrics_row::MetricsRow;
use crate::ports::store_port::MetricsStore;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub struct SqliteAdapter {
    path: PathBuf,
}

impl SqliteAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, QuotepollError> {
        Connection::open(&self.path).map_err(|e: rusqlite::Error| QuotepollError::Database {
            reason: format!("{}: {}", self.path.display(), e),
        })
    }

    /// Register a symbol. Registering an existing symbol is a no-op.
    pub fn insert_symbol(&self, symbol: &str) -> Result<(), QuotepollError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT OR IGNORE INTO symbols (symbol) VALUES (?1)",
            params![symbol],
        )
        .map_err(QuotepollError::query)?;
        Ok(())
    }
}

impl MetricsStore for SqliteAdapter {
    fn initialize_schema(&self) -> Result<(), QuotepollError> {
        let conn = self.connect()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS symbols (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT UNIQUE NOT NULL
            );
            CREATE TABLE IF NOT EXISTS metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT,
                timestamp TEXT,
                price REAL,
                open REAL,
                high REAL,
                low REAL,
                close REAL,
                volume INTEGER,
                avg_volume REAL,
                ema REAL,
                vwap REAL
            );
            CREATE INDEX IF NOT EXISTS idx_metrics_symbol_timestamp ON metrics(symbol, timestamp);",
        )
        .map_err(QuotepollError::query)
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuotepollError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT symbol FROM symbols ORDER BY symbol")
            .map_err(QuotepollError::query)?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(QuotepollError::query)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(QuotepollError::query)?);
        }
        Ok(symbols)
    }

    fn insert_metrics(&self, row: &MetricsRow) -> Result<(), QuotepollError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO metrics
                (symbol, timestamp, price, open, high, low, close, volume, avg_volume, ema, vwap)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                row.symbol,
                row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                row.price,
                row.open,
                row.high,
                row.low,
                row.close,
                row.volume,
                row.avg_volume,
                row.ema,
                row.vwap
            ],
        )
        .map_err(QuotepollError::query)?;
        Ok(())
    }

    fn recent_metrics(&self, symbol: &str, limit: usize) -> Result<Vec<MetricsRow>, QuotepollError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, timestamp, price, open, high, low, close,
                        volume, avg_volume, ema, vwap
                 FROM metrics
                 WHERE symbol = ?1
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?2",
            )
            .map_err(QuotepollError::query)?;

        let rows = stmt
            .query_map(params![symbol, limit as i64], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = NaiveDateTime::parse_from_str(&ts_str, TIMESTAMP_FORMAT)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            1,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                Ok(MetricsRow {
                    symbol: row.get(0)?,
                    timestamp,
                    price: row.get(2)?,
                    open: row.get(3)?,
                    high: row.get(4)?,
                    low: row.get(5)?,
                    close: row.get(6)?,
                    volume: row.get(7)?,
                    avg_volume: row.get(8)?,
                    ema: row.get(9)?,
                    vwap: row.get(10)?,
                })
            })
            .map_err(QuotepollError::query)?;

        let mut metrics = Vec::new();
        for row in rows {
            metrics.push(row.map_err(QuotepollError::query)?);
        }
        Ok(metrics)
    }
}

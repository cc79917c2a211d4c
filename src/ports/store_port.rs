//! Relational store port: symbol registry reads and metrics history writes.

use crate::domain::error::QuotepollError;
use crate::domain::metrics_row::MetricsRow;

/// Each call acquires its own connection and releases it before returning.
pub trait MetricsStore {
    /// Create the `symbols` and `metrics` tables if they do not exist.
    fn initialize_schema(&self) -> Result<(), QuotepollError>;

    /// All registered symbols, ordered by symbol.
    fn list_symbols(&self) -> Result<Vec<String>, QuotepollError>;

    /// Append one row. Rows are never updated or deleted.
    fn insert_metrics(&self, row: &MetricsRow) -> Result<(), QuotepollError>;

    /// Most recent rows for `symbol`, newest first.
    fn recent_metrics(&self, symbol: &str, limit: usize) -> Result<Vec<MetricsRow>, QuotepollError>;
}

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
pub use quotepoll::domain::error::QuotepollError;
pub use quotepoll::domain::metrics_row::MetricsRow;
pub use quotepoll::domain::ohlcv::{OhlcvBar, Period};
use quotepoll::domain::scheduler::CancellationToken;
use quotepoll::ports::clock_port::Clock;
use quotepoll::ports::quote_port::QuotePort;
use quotepoll::ports::store_port::MetricsStore;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

pub struct MockQuotePort {
    pub data: HashMap<(String, Period), Vec<OhlcvBar>>,
    pub errors: HashMap<(String, Period), String>,
    pub calls: RefCell<Vec<(String, Period)>>,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, period: Period, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert((symbol.to_string(), period), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, period: Period, reason: &str) -> Self {
        self.errors
            .insert((symbol.to_string(), period), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl QuotePort for MockQuotePort {
    fn fetch_bars(&self, symbol: &str, period: Period) -> Result<Vec<OhlcvBar>, QuotepollError> {
        self.calls.borrow_mut().push((symbol.to_string(), period));
        let key = (symbol.to_string(), period);
        if let Some(reason) = self.errors.get(&key) {
            return Err(QuotepollError::Provider {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(&key).cloned().unwrap_or_default())
    }
}

pub struct MockStore {
    pub symbols: Vec<String>,
    pub registry_error: Option<String>,
    pub failing_inserts: HashSet<String>,
    pub rows: RefCell<Vec<MetricsRow>>,
    pub list_calls: Cell<usize>,
    /// Cancel this token once `list_symbols` has been called this many times.
    pub cancel_after: Option<(usize, CancellationToken)>,
}

impl MockStore {
    pub fn new(symbols: &[&str]) -> Self {
        Self {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            registry_error: None,
            failing_inserts: HashSet::new(),
            rows: RefCell::new(Vec::new()),
            list_calls: Cell::new(0),
            cancel_after: None,
        }
    }

    pub fn with_registry_error(mut self, reason: &str) -> Self {
        self.registry_error = Some(reason.to_string());
        self
    }

    pub fn with_failing_insert(mut self, symbol: &str) -> Self {
        self.failing_inserts.insert(symbol.to_string());
        self
    }

    pub fn with_cancel_after(mut self, cycles: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((cycles, token));
        self
    }

    pub fn rows(&self) -> Vec<MetricsRow> {
        self.rows.borrow().clone()
    }
}

impl MetricsStore for MockStore {
    fn initialize_schema(&self) -> Result<(), QuotepollError> {
        Ok(())
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuotepollError> {
        self.list_calls.set(self.list_calls.get() + 1);
        if let Some((cycles, token)) = &self.cancel_after {
            if self.list_calls.get() >= *cycles {
                token.cancel();
            }
        }
        match &self.registry_error {
            Some(reason) => Err(QuotepollError::Database {
                reason: reason.clone(),
            }),
            None => Ok(self.symbols.clone()),
        }
    }

    fn insert_metrics(&self, row: &MetricsRow) -> Result<(), QuotepollError> {
        if self.failing_inserts.contains(&row.symbol) {
            return Err(QuotepollError::DatabaseQuery {
                reason: format!("insert rejected for {}", row.symbol),
            });
        }
        self.rows.borrow_mut().push(row.clone());
        Ok(())
    }

    fn recent_metrics(&self, symbol: &str, limit: usize) -> Result<Vec<MetricsRow>, QuotepollError> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .rev()
            .filter(|r| r.symbol == symbol)
            .take(limit)
            .cloned()
            .collect())
    }
}

pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(datetime(2024, 6, 3, 10, 0))
}

pub fn datetime(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hh, mm, 0)
        .unwrap()
}

pub fn make_bar(symbol: &str, timestamp: NaiveDateTime, close: f64, volume: i64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        timestamp,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: Some(volume),
    }
}

/// `count` daily bars ending the day before 2024-06-03, all at `close`/`volume`.
pub fn constant_bars(symbol: &str, count: usize, close: f64, volume: i64) -> Vec<OhlcvBar> {
    let end = datetime(2024, 6, 3, 0, 0);
    (0..count)
        .map(|i| make_bar(symbol, end - Duration::days((count - i) as i64), close, volume))
        .collect()
}

/// Quotes for a symbol with data in both windows.
pub fn healthy_quotes(port: MockQuotePort, symbol: &str) -> MockQuotePort {
    port.with_bars(symbol, Period::OneDay, constant_bars(symbol, 1, 10.0, 1000))
        .with_bars(symbol, Period::TwentyDays, constant_bars(symbol, 20, 10.0, 1000))
}

//! Market data provider port.

use crate::domain::error::QuotepollError;
use crate::domain::ohlcv::{OhlcvBar, Period};

pub trait QuotePort {
    /// Time-ordered bars for `symbol` over `period`. An empty vector means the
    /// provider answered but had no data.
    fn fetch_bars(&self, symbol: &str, period: Period) -> Result<Vec<OhlcvBar>, QuotepollError>;
}

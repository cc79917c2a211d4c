//! OHLCV bar representation and lookback periods.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// `None` when the provider reported prices without a traded volume.
    pub volume: Option<i64>,
}

impl OhlcvBar {
    /// close * volume, or `None` when the bar carries no volume.
    pub fn turnover(&self) -> Option<f64> {
        self.volume.map(|v| self.close * v as f64)
    }
}

/// Lookback window requested from the quote provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    OneDay,
    TwentyDays,
}

impl Period {
    /// Provider range token ("1d", "20d").
    pub fn as_range(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::TwentyDays => "20d",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_range())
    }
}

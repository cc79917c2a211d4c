//! Point-in-time metrics row appended once per symbol per cycle.

use chrono::NaiveDateTime;

use crate::domain::indicator::ema::latest_ema;
use crate::domain::indicator::volume::calculate_average_volume;
use crate::domain::indicator::vwap::latest_vwap;
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_EMA_SPAN: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
    pub avg_volume: Option<f64>,
    pub ema: Option<f64>,
    pub vwap: Option<f64>,
}

impl MetricsRow {
    /// Build a row from the intraday (1-day) and lookback (20-day) bar sets.
    ///
    /// Latest OHLCV and VWAP come from `daily`; average volume and EMA come
    /// from `lookback`. Returns `None` when `daily` is empty. All prices and
    /// averages are rounded to 2 decimals.
    pub fn compute(
        symbol: &str,
        daily: &[OhlcvBar],
        lookback: &[OhlcvBar],
        ema_span: usize,
        timestamp: NaiveDateTime,
    ) -> Option<Self> {
        let last = daily.last()?;

        Some(Self {
            symbol: symbol.to_string(),
            timestamp,
            price: round2(last.close),
            open: round2(last.open),
            high: round2(last.high),
            low: round2(last.low),
            close: round2(last.close),
            volume: last.volume,
            avg_volume: calculate_average_volume(lookback).map(round2),
            ema: latest_ema(lookback, ema_span).map(round2),
            vwap: latest_vwap(daily).map(round2),
        })
    }
}

/// Round half away from zero to 2 decimals, matching NUMERIC(10,2) storage.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn bars(symbol: &str, closes: &[f64], volume: Option<i64>) -> Vec<OhlcvBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                symbol: symbol.into(),
                timestamp: ts() - Duration::days((closes.len() - i) as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume,
            })
            .collect()
    }

    #[test]
    fn round2_behaviour() {
        assert_relative_eq!(round2(10.004), 10.0);
        assert_relative_eq!(round2(10.006), 10.01);
        assert_relative_eq!(round2(-3.14159), -3.14);
        assert_relative_eq!(round2(1000.0), 1000.0);
    }

    #[test]
    fn constant_inputs_produce_constant_metrics() {
        let daily = bars("ABC", &[10.0], Some(1000));
        let lookback = bars("ABC", &[10.0; 20], Some(1000));

        let row = MetricsRow::compute("ABC", &daily, &lookback, DEFAULT_EMA_SPAN, ts()).unwrap();

        assert_eq!(row.symbol, "ABC");
        assert_eq!(row.timestamp, ts());
        assert_eq!(row.volume, Some(1000));
        assert_relative_eq!(row.price, 10.0);
        assert_relative_eq!(row.close, 10.0);
        assert_relative_eq!(row.avg_volume.unwrap(), 1000.0);
        assert_relative_eq!(row.ema.unwrap(), 10.0);
        assert_relative_eq!(row.vwap.unwrap(), 10.0);
    }

    #[test]
    fn latest_ohlc_taken_from_last_daily_bar() {
        let daily = bars("ABC", &[10.0, 12.346], Some(500));
        let lookback = bars("ABC", &[11.0; 5], Some(500));

        let row = MetricsRow::compute("ABC", &daily, &lookback, DEFAULT_EMA_SPAN, ts()).unwrap();

        assert_relative_eq!(row.price, 12.35);
        assert_relative_eq!(row.open, 11.85);
        assert_relative_eq!(row.high, 13.35);
        assert_relative_eq!(row.low, 11.35);
    }

    #[test]
    fn missing_volume_leaves_volume_metrics_absent() {
        let daily = bars("ABC", &[10.0], None);
        let lookback = bars("ABC", &[10.0; 3], None);

        let row = MetricsRow::compute("ABC", &daily, &lookback, DEFAULT_EMA_SPAN, ts()).unwrap();

        assert!(row.volume.is_none());
        assert!(row.avg_volume.is_none());
        assert!(row.vwap.is_none());
        assert_relative_eq!(row.ema.unwrap(), 10.0);
    }

    #[test]
    fn latest_daily_bar_without_volume_has_no_vwap() {
        let mut daily = bars("ABC", &[10.0, 11.0], Some(500));
        daily[1].volume = None;
        let lookback = bars("ABC", &[10.0; 5], Some(500));

        let row = MetricsRow::compute("ABC", &daily, &lookback, DEFAULT_EMA_SPAN, ts()).unwrap();

        assert!(row.volume.is_none());
        assert!(row.vwap.is_none());
        assert_relative_eq!(row.avg_volume.unwrap(), 500.0);
    }

    #[test]
    fn empty_daily_set_yields_none() {
        let lookback = bars("ABC", &[10.0; 3], Some(1));
        assert!(MetricsRow::compute("ABC", &[], &lookback, DEFAULT_EMA_SPAN, ts()).is_none());
    }
}

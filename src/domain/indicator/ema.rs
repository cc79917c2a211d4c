//! Exponential Moving Average of closing price.
//!
//! alpha = 2/(span+1), seeded directly from the first close with no warmup:
//! EMA[0] = C[0], EMA[i] = C[i]*alpha + EMA[i-1]*(1-alpha).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], span: usize) -> IndicatorSeries {
    if span == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Ema(span));
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut values = Vec::with_capacity(bars.len());
    let mut ema = bars[0].close;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            ema = bar.close * alpha + ema * (1.0 - alpha);
        }
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value: ema,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}

/// EMA evaluated at the most recent bar.
pub fn latest_ema(bars: &[OhlcvBar], span: usize) -> Option<f64> {
    calculate_ema(bars, span).latest()
}

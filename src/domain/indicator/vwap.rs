//! Cumulative Volume Weighted Average Price.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

/// Running sum(close * volume) / sum(volume).
///
/// Bars without volume contribute nothing and get no point. A point is
/// emitted only once the cumulative volume is positive, so a set with no
/// usable volume produces an empty series.
pub fn calculate_vwap(bars: &[OhlcvBar]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut cum_pv = 0.0;
    let mut cum_vol = 0.0;

    for bar in bars {
        let (Some(volume), Some(turnover)) = (bar.volume, bar.turnover()) else {
            continue;
        };
        cum_pv += turnover;
        cum_vol += volume as f64;
        if cum_vol > 0.0 {
            values.push(IndicatorPoint {
                timestamp: bar.timestamp,
                value: cum_pv / cum_vol,
            });
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Vwap,
        values,
    }
}

/// VWAP evaluated at the most recent bar. `None` when that bar has no volume.
pub fn latest_vwap(bars: &[OhlcvBar]) -> Option<f64> {
    bars.last()?.volume?;
    calculate_vwap(bars).latest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn make_bars(rows: &[(f64, Option<i64>)]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        rows.iter()
            .enumerate()
            .map(|(i, &(close, volume))| OhlcvBar {
                symbol: "TEST".into(),
                timestamp: start + Duration::minutes(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume,
            })
            .collect()
    }

    #[test]
    fn weighted_by_volume() {
        let bars = make_bars(&[(10.0, Some(100)), (20.0, Some(300))]);
        // (1000 + 6000) / 400
        assert_relative_eq!(latest_vwap(&bars).unwrap(), 17.5);
    }

    #[test]
    fn running_values() {
        let bars = make_bars(&[(10.0, Some(100)), (20.0, Some(100)), (30.0, Some(200))]);
        let series = calculate_vwap(&bars);
        assert_eq!(series.values.len(), 3);
        assert_relative_eq!(series.values[0].value, 10.0);
        assert_relative_eq!(series.values[1].value, 15.0);
        assert_relative_eq!(series.values[2].value, 22.5);
    }

    #[test]
    fn missing_volume_is_none() {
        let bars = make_bars(&[(10.0, None), (11.0, None)]);
        assert!(latest_vwap(&bars).is_none());
    }

    #[test]
    fn zero_volume_is_none() {
        let bars = make_bars(&[(10.0, Some(0))]);
        assert!(latest_vwap(&bars).is_none());
    }

    #[test]
    fn last_bar_without_volume_is_none() {
        let bars = make_bars(&[(10.0, Some(100)), (50.0, None)]);
        assert!(latest_vwap(&bars).is_none());
    }

    #[test]
    fn earlier_bars_without_volume_are_skipped() {
        let bars = make_bars(&[(10.0, Some(100)), (50.0, None), (20.0, Some(100))]);
        let series = calculate_vwap(&bars);
        assert_eq!(series.values.len(), 2);
        assert_eq!(series.values[1].timestamp, bars[2].timestamp);
        assert_relative_eq!(latest_vwap(&bars).unwrap(), 15.0);
    }

    #[test]
    fn empty_is_none() {
        assert!(latest_vwap(&[]).is_none());
    }

    proptest! {
        #[test]
        fn single_bar_vwap_is_its_close(close in 0.01f64..100_000.0, volume in 1i64..1_000_000_000) {
            let bars = make_bars(&[(close, Some(volume))]);
            let vwap = latest_vwap(&bars).unwrap();
            prop_assert!((vwap - close).abs() <= 1e-9 * close.max(1.0));
        }
    }
}

//! Average traded volume over a bar set.

use crate::domain::ohlcv::OhlcvBar;

/// Arithmetic mean of volume. Bars without volume are skipped; `None` when
/// no bar carries volume.
pub fn calculate_average_volume(bars: &[OhlcvBar]) -> Option<f64> {
    let (sum, count) = bars
        .iter()
        .filter_map(|b| b.volume)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v as f64, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

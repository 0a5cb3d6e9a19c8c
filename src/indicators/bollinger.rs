// =============================================================================
// Bollinger Bands
// =============================================================================
//
// middle = SMA(window) of closes
// width  = num_std * σ, with σ the *population* standard deviation over the
//          same window (divide by N, not N-1)
// upper  = middle + width
// lower  = middle - width
//
// The band position of a price p is (p - lower) / (upper - lower) clamped to
// [0, 1]. A flat window collapses the bands (width 0) and the position is
// undefined.

use serde::{Deserialize, Serialize};

/// Bollinger Band values at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// Half-band: `num_std` population standard deviations.
    pub width: f64,
}

/// Calculate Bollinger Bands over the last `window` closes.
///
/// Returns `None` when `window` is zero, there are fewer than `window`
/// closes, or the result is non-finite.
pub fn calculate_bollinger(
    closes: &[f64],
    window: usize,
    num_std: f64,
) -> Option<BollingerResult> {
    if window == 0 || closes.len() < window {
        return None;
    }

    let slice = &closes[closes.len() - window..];
    let middle = slice.iter().sum::<f64>() / window as f64;

    let variance = slice.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / window as f64;
    let width = num_std * variance.sqrt();

    let upper = middle + width;
    let lower = middle - width;

    if middle.is_finite() && width.is_finite() {
        Some(BollingerResult {
            upper,
            middle,
            lower,
            width,
        })
    } else {
        None
    }
}

/// Position of `price` inside the bands, clamped to [0, 1].
///
/// `None` when the bands are degenerate (zero width, e.g. a flat window) —
/// the scoring policy treats that as a neutral factor, not as position 0.
pub fn band_position(price: f64, bands: &BollingerResult) -> Option<f64> {
    let range = bands.upper - bands.lower;
    if range <= 0.0 {
        return None;
    }
    let position = (price - bands.lower) / range;
    if position.is_finite() {
        Some(position.clamp(0.0, 1.0))
    } else {
        None
    }
}

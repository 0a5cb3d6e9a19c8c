// =============================================================================
// MACD — Moving Average Convergence / Divergence
// =============================================================================
//
// DIF        = EMA(fast) - EMA(slow) of closing prices (spans 12 / 26)
// Signal     = EMA(signal_span) of the DIF series (span 9)
// Histogram  = (DIF - Signal) * 2           (scaled x2 by convention)
//
// EMA recurrence: ema_t = close_t * k + ema_{t-1} * (1 - k), k = 2/(span+1),
// seeded with the simple mean of the first `span` values.
//
// The result is undefined until the slow EMA has enough bars (slow span
// minimum). A "fresh" golden/death cross is detected from the sign change of
// DIF - Signal between the last two aligned points.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Compute the EMA series for the given `values` slice and `span`.
///
/// Returns an empty `Vec` when the input is too short or the span is zero.
/// Each output element corresponds to an input index starting at `span - 1`.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.len() < span {
        return Vec::new();
    }

    let multiplier = 2.0 / (span + 1) as f64;

    // Seed: SMA of the first `span` values.
    let seed: f64 = values[..span].iter().sum::<f64>() / span as f64;
    if !seed.is_finite() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(values.len() - span + 1);
    result.push(seed);

    let mut prev = seed;
    for &v in &values[span..] {
        let ema = v * multiplier + prev * (1.0 - multiplier);
        if !ema.is_finite() {
            // A broken series must not leak downstream.
            break;
        }
        result.push(ema);
        prev = ema;
    }

    result
}

/// A DIF / Signal crossover that completed within the last bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdCross {
    /// DIF crossed above the signal line.
    Golden,
    /// DIF crossed below the signal line.
    Death,
}

/// MACD values evaluated at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub dif: f64,
    pub signal: f64,
    pub histogram: f64,
    pub cross: Option<MacdCross>,
}

/// Compute MACD at the latest bar.
///
/// Returns `None` when any span is zero, `fast >= slow`, there are fewer
/// than `slow` closes, or an intermediate value is non-finite.
///
/// When the DIF series is still shorter than `signal_span`, the signal EMA
/// is seeded over the bars that do exist, so the line converges toward the
/// standard definition as history accumulates.
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> Option<MacdResult> {
    if fast == 0 || slow == 0 || signal_span == 0 || fast >= slow {
        return None;
    }
    if closes.len() < slow {
        return None;
    }

    let ema_fast = ema_series(closes, fast);
    let ema_slow = ema_series(closes, slow);
    if ema_slow.is_empty() {
        return None;
    }

    // Align the two EMA series at the tail: ema_fast starts (slow - fast)
    // values earlier than ema_slow.
    let offset = slow - fast;
    if ema_fast.len() < ema_slow.len() + offset {
        return None; // one of the series truncated on a non-finite value
    }

    let dif: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(i, &s)| ema_fast[i + offset] - s)
        .collect();

    let effective_span = signal_span.min(dif.len());
    let signal = ema_series(&dif, effective_span);

    let dif_last = *dif.last()?;
    let signal_last = *signal.last()?;
    let histogram = (dif_last - signal_last) * 2.0;
    if !dif_last.is_finite() || !signal_last.is_finite() || !histogram.is_finite() {
        return None;
    }

    let cross = if dif.len() >= 2 && signal.len() >= 2 {
        let prev_delta = dif[dif.len() - 2] - signal[signal.len() - 2];
        detect_cross(prev_delta, dif_last - signal_last)
    } else {
        None
    };

    Some(MacdResult {
        dif: dif_last,
        signal: signal_last,
        histogram,
        cross,
    })
}

/// Sign-change test for the last two DIF - Signal deltas.
fn detect_cross(prev_delta: f64, cur_delta: f64) -> Option<MacdCross> {
    if prev_delta <= 0.0 && cur_delta > 0.0 {
        Some(MacdCross::Golden)
    } else if prev_delta >= 0.0 && cur_delta < 0.0 {
        Some(MacdCross::Death)
    } else {
        None
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_known_values() {
        // 5-span EMA of [1..10]: seed SMA = 3.0, k = 1/3.
        let values: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = ema_series(&values, 5);
        assert_eq!(ema.len(), 6);

        let k = 2.0 / 6.0;
        let mut expected = 3.0;
        assert!((ema[0] - expected).abs() < 1e-10);
        for (i, &v) in values[5..].iter().enumerate() {
            expected = v * k + expected * (1.0 - k);
            assert!((ema[i + 1] - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn ema_insufficient_data() {
        assert!(ema_series(&[1.0, 2.0], 5).is_empty());
        assert!(ema_series(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn macd_null_below_slow_span() {
        let closes: Vec<f64> = (1..=25).map(|x| x as f64).collect();
        assert!(calculate_macd(&closes, 12, 26, 9).is_none());
    }

    #[test]
    fn macd_defined_at_slow_span() {
        let closes: Vec<f64> = (1..=26).map(|x| x as f64).collect();
        let macd = calculate_macd(&closes, 12, 26, 9).unwrap();
        // Single DIF point: the signal seeds on it, so the histogram is 0.
        assert!((macd.histogram - 0.0).abs() < 1e-10);
        assert!(macd.cross.is_none());
    }

    #[test]
    fn macd_rejects_bad_spans() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        assert!(calculate_macd(&closes, 0, 26, 9).is_none());
        assert!(calculate_macd(&closes, 26, 12, 9).is_none());
        assert!(calculate_macd(&closes, 12, 12, 9).is_none());
        assert!(calculate_macd(&closes, 12, 26, 0).is_none());
    }

    #[test]
    fn macd_uptrend_has_positive_histogram() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let macd = calculate_macd(&closes, 12, 26, 9).unwrap();
        assert!(macd.dif > 0.0);
        assert!(macd.histogram > 0.0, "got {}", macd.histogram);
        // A steady linear uptrend settled long ago — no fresh cross.
        assert!(macd.cross.is_none());
    }

    #[test]
    fn macd_downtrend_has_negative_histogram() {
        let closes: Vec<f64> = (0..100).map(|i| 200.0 - i as f64).collect();
        let macd = calculate_macd(&closes, 12, 26, 9).unwrap();
        assert!(macd.dif < 0.0);
        assert!(macd.histogram < 0.0);
    }

    #[test]
    fn macd_flat_series_is_all_zero() {
        let closes = vec![100.0; 60];
        let macd = calculate_macd(&closes, 12, 26, 9).unwrap();
        assert!(macd.dif.abs() < 1e-10);
        assert!(macd.signal.abs() < 1e-10);
        assert!(macd.histogram.abs() < 1e-10);
        assert!(macd.cross.is_none());
    }

    #[test]
    fn detect_cross_sign_changes() {
        assert_eq!(detect_cross(-0.5, 0.5), Some(MacdCross::Golden));
        assert_eq!(detect_cross(0.0, 0.5), Some(MacdCross::Golden));
        assert_eq!(detect_cross(0.5, -0.5), Some(MacdCross::Death));
        assert_eq!(detect_cross(0.0, -0.5), Some(MacdCross::Death));
        assert_eq!(detect_cross(0.5, 0.6), None);
        assert_eq!(detect_cross(-0.5, -0.6), None);
        assert_eq!(detect_cross(0.5, 0.0), None);
    }

    #[test]
    fn v_shape_produces_a_golden_cross_somewhere() {
        // Decline then recovery: as the recovery unfolds, DIF must cross
        // above the signal line on exactly one of the suffix evaluations.
        let mut closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        closes.extend((0..60).map(|i| 140.0 + (i as f64) * 2.0));

        let mut seen_golden = false;
        for end in 30..=closes.len() {
            if let Some(macd) = calculate_macd(&closes[..end], 12, 26, 9) {
                if macd.cross == Some(MacdCross::Golden) {
                    seen_golden = true;
                }
            }
        }
        assert!(seen_golden, "expected a golden cross during the recovery");
    }
}

// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the smoothed average of TR using the same Wilder recurrence as RSI:
//   ATR_0 = SMA of first `window` TR values
//   ATR_t = (ATR_{t-1} * (window - 1) + TR_t) / window
//
// The first bar of a series has no previous close and therefore no TR, so
// ATR needs `window + 1` bars.
// =============================================================================

use crate::series::PriceBar;

/// Compute the most recent ATR value from daily bars (oldest first).
///
/// Returns `None` when:
/// - `window` is zero.
/// - There are fewer than `window + 1` bars.
/// - Any intermediate value is non-finite.
pub fn calculate_atr(bars: &[PriceBar], window: usize) -> Option<f64> {
    if window == 0 || bars.len() < window + 1 {
        return None;
    }

    let mut tr_values: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    for i in 1..bars.len() {
        let high = bars[i].high;
        let low = bars[i].low;
        let prev_close = bars[i - 1].close;

        let hl = high - low;
        let hc = (high - prev_close).abs();
        let lc = (low - prev_close).abs();

        tr_values.push(hl.max(hc).max(lc));
    }

    // Seed with the SMA of the first `window` TR values, then smooth.
    let seed: f64 = tr_values[..window].iter().sum::<f64>() / window as f64;
    if !seed.is_finite() {
        return None;
    }

    let window_f = window as f64;
    let mut atr = seed;
    for &tr in &tr_values[window..] {
        atr = (atr * (window_f - 1.0) + tr) / window_f;
        if !atr.is_finite() {
            return None;
        }
    }

    Some(atr)
}

/// ATR as a percentage of the latest close — the volatility figure shown in
/// the report. Useful for comparing instruments on different price scales.
pub fn volatility_pct(bars: &[PriceBar], window: usize) -> Option<f64> {
    let atr = calculate_atr(bars, window)?;
    let last_close = bars.last()?.close;
    if last_close == 0.0 {
        return None;
    }
    Some((atr / last_close) * 100.0)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(i: u32, open: f64, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64),
            open,
            high,
            low,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn atr_window_zero() {
        let bars: Vec<PriceBar> = (0..20).map(|i| bar(i, 100.0, 105.0, 95.0, 102.0)).collect();
        assert!(calculate_atr(&bars, 0).is_none());
    }

    #[test]
    fn atr_insufficient_data() {
        // Need window + 1 = 15 bars for window=14, only have 10.
        let bars: Vec<PriceBar> = (0..10).map(|i| bar(i, 100.0, 105.0, 95.0, 102.0)).collect();
        assert!(calculate_atr(&bars, 14).is_none());
    }

    #[test]
    fn atr_single_bar_is_undefined() {
        // No previous close => no true range.
        let bars = vec![bar(0, 100.0, 105.0, 95.0, 102.0)];
        assert!(calculate_atr(&bars, 1).is_none());
    }

    #[test]
    fn atr_exact_minimum_data() {
        let bars = vec![
            bar(0, 100.0, 102.0, 98.0, 101.0),
            bar(1, 101.0, 104.0, 99.0, 103.0),
            bar(2, 103.0, 106.0, 100.0, 105.0),
            bar(3, 105.0, 108.0, 102.0, 107.0),
        ];
        let atr = calculate_atr(&bars, 3).unwrap();
        assert!(atr > 0.0);
        assert!(atr.is_finite());
    }

    #[test]
    fn atr_constant_range_converges() {
        // Every bar spans 10 with close at the midpoint: TR is constant 10.
        let mut bars = Vec::new();
        for i in 0..30 {
            let base = 100.0 + i as f64 * 0.1;
            bars.push(bar(i, base, base + 5.0, base - 5.0, base));
        }
        let atr = calculate_atr(&bars, 14).unwrap();
        assert!((atr - 10.0).abs() < 1.0, "expected ATR near 10.0, got {atr}");
    }

    #[test]
    fn atr_true_range_uses_prev_close() {
        // Gap up: |H - prevClose| dominates H - L.
        let bars = vec![
            bar(0, 100.0, 105.0, 95.0, 95.0),
            bar(1, 110.0, 115.0, 108.0, 112.0), // |115 - 95| = 20 > 7
            bar(2, 112.0, 118.0, 110.0, 115.0),
            bar(3, 115.0, 120.0, 113.0, 118.0),
        ];
        let atr = calculate_atr(&bars, 3).unwrap();
        assert!(atr > 7.0, "ATR should reflect the gap, got {atr}");
    }

    #[test]
    fn volatility_pct_is_positive() {
        let bars: Vec<PriceBar> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64;
                bar(i, base, base + 3.0, base - 3.0, base + 1.0)
            })
            .collect();
        let vol = volatility_pct(&bars, 14).unwrap();
        assert!(vol > 0.0);
        assert!(vol.is_finite());
    }

    #[test]
    fn atr_nan_returns_none() {
        let mut bars: Vec<PriceBar> = (0..4).map(|i| bar(i, 100.0, 105.0, 95.0, 100.0)).collect();
        bars[1].high = f64::NAN;
        assert!(calculate_atr(&bars, 3).is_none());
    }
}

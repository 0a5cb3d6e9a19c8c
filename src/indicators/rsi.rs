// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Seed average gain / average loss with the SMA of the first
//          `window` deltas.
// Step 3 — Apply Wilder's exponential smoothing:
//            avg_gain = (prev_avg_gain * (window - 1) + current_gain) / window
//            avg_loss = (prev_avg_loss * (window - 1) + current_loss) / window
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// When the average loss is zero the division is skipped and RSI is 100 —
// this includes a perfectly flat series. That is the single deliberate
// numeric fallback in this module.
// =============================================================================

/// Compute the full RSI series for the given `closes` and `window`.
///
/// The returned vector has one RSI value per close starting at index
/// `window` (the first `window` closes seed the averages).
///
/// # Edge cases
/// - `window == 0` => empty vec
/// - `closes.len() < window + 1` => empty vec (need at least `window` deltas)
/// - Average loss of zero => RSI = 100.0 (no down moves, flat included).
/// - Non-finite results truncate the series.
pub fn calculate_rsi(closes: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || closes.len() < window + 1 {
        return Vec::new();
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // Seed with the simple average of the first `window` deltas.
    let (sum_gain, sum_loss) = deltas[..window].iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l + d.abs())
        }
    });

    let window_f = window as f64;
    let mut avg_gain = sum_gain / window_f;
    let mut avg_loss = sum_loss / window_f;

    let mut result = Vec::with_capacity(deltas.len() - window + 1);
    match rsi_from_averages(avg_gain, avg_loss) {
        Some(first) => result.push(first),
        None => return Vec::new(),
    }

    for &delta in &deltas[window..] {
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { delta.abs() } else { 0.0 };

        avg_gain = (avg_gain * (window_f - 1.0) + gain) / window_f;
        avg_loss = (avg_loss * (window_f - 1.0) + loss) / window_f;

        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => result.push(rsi),
            None => break, // Non-finite — stop producing values.
        }
    }

    result
}

/// The most recent RSI value, or `None` below `window + 1` closes.
pub fn current_rsi(closes: &[f64], window: usize) -> Option<f64> {
    calculate_rsi(closes, window).last().copied()
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Average loss of zero maps to 100.0 (divide-by-zero branch, documented).
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi)
    } else {
        None
    }
}

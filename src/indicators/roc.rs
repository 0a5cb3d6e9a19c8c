// =============================================================================
// Rate of Change (ROC) — Momentum Indicator
// =============================================================================
//
// ROC = ((close - close_n) / close_n) * 100 over an n-bar look-back.
// Reported in the indicator set for context; it does not enter the score.

/// The most recent ROC value.
///
/// Returns `None` when `window` is zero or there are not enough closes for
/// a full look-back.
pub fn current_roc(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() <= window {
        return None;
    }
    let latest = *closes.last()?;
    let reference = closes[closes.len() - 1 - window];
    if reference == 0.0 {
        return None;
    }
    let roc = (latest - reference) / reference * 100.0;
    if roc.is_finite() {
        Some(roc)
    } else {
        None
    }
}

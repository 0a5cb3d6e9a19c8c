// =============================================================================
// Simple Moving Averages — trend alignment classification
// =============================================================================
//
// The engine tracks three SMA windows (short/medium/long, default 5/20/60)
// over closing prices. Trend classification is strict:
//
//   bullish  — short > medium > long
//   bearish  — short < medium < long
//   mixed    — anything else, including any window without enough data
// =============================================================================

use serde::{Deserialize, Serialize};

/// Arithmetic mean of the last `window` values.
///
/// Returns `None` when `window` is zero or there are fewer than `window`
/// values — the indicator is undefined, never silently zero.
pub fn calculate_sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let sum: f64 = values[values.len() - window..].iter().sum();
    let sma = sum / window as f64;
    if sma.is_finite() {
        Some(sma)
    } else {
        None
    }
}

/// How the short/medium/long moving averages stack up at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendAlignment {
    Bullish,
    Bearish,
    Mixed,
}

impl std::fmt::Display for TrendAlignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

/// Classify the MA stack. Any missing average means the classification is
/// `Mixed` — insufficient data is not a trend.
pub fn ma_alignment(
    short: Option<f64>,
    medium: Option<f64>,
    long: Option<f64>,
) -> TrendAlignment {
    let (s, m, l) = match (short, medium, long) {
        (Some(s), Some(m), Some(l)) => (s, m, l),
        _ => return TrendAlignment::Mixed,
    };

    if s > m && m > l {
        TrendAlignment::Bullish
    } else if s < m && m < l {
        TrendAlignment::Bearish
    } else {
        TrendAlignment::Mixed
    }
}

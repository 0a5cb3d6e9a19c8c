// =============================================================================
// Volume Ratio — participation relative to the recent average
// =============================================================================
//
// ratio = latest volume / SMA(volume) over the medium moving-average window.
// A ratio >= 1.5 signals unusually high participation, <= 0.5 unusually low.

use serde::{Deserialize, Serialize};

use super::ma::calculate_sma;

/// Classification of the latest volume against its recent average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeSignal {
    High,
    Low,
    Normal,
}

impl std::fmt::Display for VolumeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

/// Latest volume divided by its `window`-bar simple average.
///
/// Returns `None` below `window` bars or when the average volume is zero
/// (a halted or zero-volume instrument has no meaningful ratio).
pub fn volume_ratio(volumes: &[f64], window: usize) -> Option<f64> {
    let latest = *volumes.last()?;
    let avg = calculate_sma(volumes, window)?;
    if avg <= 0.0 {
        return None;
    }
    let ratio = latest / avg;
    if ratio.is_finite() {
        Some(ratio)
    } else {
        None
    }
}

/// Classify a volume ratio against the high/low thresholds.
pub fn classify_ratio(ratio: f64, high_threshold: f64, low_threshold: f64) -> VolumeSignal {
    if ratio >= high_threshold {
        VolumeSignal::High
    } else if ratio <= low_threshold {
        VolumeSignal::Low
    } else {
        VolumeSignal::Normal
    }
}

// =============================================================================
// Analysis Parameters — window sizes and scoring policy
// =============================================================================
//
// Every tunable of the engine lives here: indicator windows, MACD spans, and
// the scoring weights/anchors. All fields carry `#[serde(default)]` so that
// a request overriding one window never has to spell out the rest.
//
// Windows are validated, never silently defaulted: a non-positive window is
// a `Configuration` error raised before any computation runs.
//
// The factor weights and RSI/Bollinger anchors are policy to calibrate, not
// physical constants, which is why they are configuration rather than
// hard-coded numbers in the scoring engine.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, Result};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_ma_short_window() -> usize {
    5
}

fn default_ma_medium_window() -> usize {
    20
}

fn default_ma_long_window() -> usize {
    60
}

fn default_rsi_window() -> usize {
    14
}

fn default_bollinger_window() -> usize {
    20
}

fn default_atr_window() -> usize {
    14
}

fn default_macd_fast_span() -> usize {
    12
}

fn default_macd_slow_span() -> usize {
    26
}

fn default_macd_signal_span() -> usize {
    9
}

fn default_bollinger_std() -> f64 {
    2.0
}

fn default_roc_window() -> usize {
    10
}

fn default_volume_high_ratio() -> f64 {
    1.5
}

fn default_volume_low_ratio() -> f64 {
    0.5
}

fn default_trend_weight() -> f64 {
    15.0
}

fn default_rsi_weight() -> f64 {
    10.0
}

fn default_macd_cross_weight() -> f64 {
    15.0
}

fn default_macd_histogram_weight() -> f64 {
    5.0
}

fn default_bollinger_weight() -> f64 {
    10.0
}

fn default_volume_weight() -> f64 {
    5.0
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_rsi_neutral_low() -> f64 {
    45.0
}

fn default_rsi_neutral_high() -> f64 {
    55.0
}

fn default_bollinger_low_position() -> f64 {
    0.2
}

fn default_bollinger_high_position() -> f64 {
    0.8
}

// =============================================================================
// ScoreWeights
// =============================================================================

/// Factor magnitudes and band anchors for the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Contribution of a strict bullish/bearish MA alignment.
    #[serde(default = "default_trend_weight")]
    pub trend: f64,

    /// Contribution at the RSI oversold/overbought anchors.
    #[serde(default = "default_rsi_weight")]
    pub rsi: f64,

    /// Contribution of a fresh golden/death cross.
    #[serde(default = "default_macd_cross_weight")]
    pub macd_cross: f64,

    /// Contribution of histogram sign alone, without a fresh cross.
    #[serde(default = "default_macd_histogram_weight")]
    pub macd_histogram: f64,

    /// Contribution at the Bollinger low/high position anchors.
    #[serde(default = "default_bollinger_weight")]
    pub bollinger: f64,

    /// Amplification/damping applied on unusual volume.
    #[serde(default = "default_volume_weight")]
    pub volume: f64,

    /// RSI below this is oversold (full positive contribution).
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    /// RSI above this is overbought (full negative contribution).
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    /// Lower edge of the neutral RSI band (zero contribution).
    #[serde(default = "default_rsi_neutral_low")]
    pub rsi_neutral_low: f64,

    /// Upper edge of the neutral RSI band (zero contribution).
    #[serde(default = "default_rsi_neutral_high")]
    pub rsi_neutral_high: f64,

    /// Band position below this is "near the lower band".
    #[serde(default = "default_bollinger_low_position")]
    pub bollinger_low_position: f64,

    /// Band position above this is "near the upper band".
    #[serde(default = "default_bollinger_high_position")]
    pub bollinger_high_position: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            trend: default_trend_weight(),
            rsi: default_rsi_weight(),
            macd_cross: default_macd_cross_weight(),
            macd_histogram: default_macd_histogram_weight(),
            bollinger: default_bollinger_weight(),
            volume: default_volume_weight(),
            rsi_oversold: default_rsi_oversold(),
            rsi_overbought: default_rsi_overbought(),
            rsi_neutral_low: default_rsi_neutral_low(),
            rsi_neutral_high: default_rsi_neutral_high(),
            bollinger_low_position: default_bollinger_low_position(),
            bollinger_high_position: default_bollinger_high_position(),
        }
    }
}

// =============================================================================
// AnalysisParams
// =============================================================================

/// Full parameter set for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Short moving-average window (default 5).
    #[serde(default = "default_ma_short_window")]
    pub ma_short_window: usize,

    /// Medium moving-average window; also the volume-ratio window (default 20).
    #[serde(default = "default_ma_medium_window")]
    pub ma_medium_window: usize,

    /// Long moving-average window (default 60).
    #[serde(default = "default_ma_long_window")]
    pub ma_long_window: usize,

    /// RSI look-back window (default 14).
    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,

    /// Bollinger Band window (default 20).
    #[serde(default = "default_bollinger_window")]
    pub bollinger_window: usize,

    /// ATR look-back window (default 14).
    #[serde(default = "default_atr_window")]
    pub atr_window: usize,

    /// MACD fast EMA span (default 12).
    #[serde(default = "default_macd_fast_span")]
    pub macd_fast_span: usize,

    /// MACD slow EMA span (default 26).
    #[serde(default = "default_macd_slow_span")]
    pub macd_slow_span: usize,

    /// MACD signal EMA span (default 9).
    #[serde(default = "default_macd_signal_span")]
    pub macd_signal_span: usize,

    /// Number of standard deviations for the Bollinger width (default 2.0).
    #[serde(default = "default_bollinger_std")]
    pub bollinger_std: f64,

    /// ROC look-back window (default 10).
    #[serde(default = "default_roc_window")]
    pub roc_window: usize,

    /// Volume ratio at or above which volume counts as "high" (default 1.5).
    #[serde(default = "default_volume_high_ratio")]
    pub volume_high_ratio: f64,

    /// Volume ratio at or below which volume counts as "low" (default 0.5).
    #[serde(default = "default_volume_low_ratio")]
    pub volume_low_ratio: f64,

    /// Scoring weights and anchors.
    #[serde(default)]
    pub weights: ScoreWeights,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            ma_short_window: default_ma_short_window(),
            ma_medium_window: default_ma_medium_window(),
            ma_long_window: default_ma_long_window(),
            rsi_window: default_rsi_window(),
            bollinger_window: default_bollinger_window(),
            atr_window: default_atr_window(),
            macd_fast_span: default_macd_fast_span(),
            macd_slow_span: default_macd_slow_span(),
            macd_signal_span: default_macd_signal_span(),
            bollinger_std: default_bollinger_std(),
            roc_window: default_roc_window(),
            volume_high_ratio: default_volume_high_ratio(),
            volume_low_ratio: default_volume_low_ratio(),
            weights: ScoreWeights::default(),
        }
    }
}

/// Per-request window overrides accepted by the analyze endpoint. Absent
/// fields keep the server defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowOverrides {
    #[serde(default)]
    pub ma_short_window: Option<usize>,
    #[serde(default)]
    pub ma_medium_window: Option<usize>,
    #[serde(default)]
    pub ma_long_window: Option<usize>,
    #[serde(default)]
    pub rsi_window: Option<usize>,
    #[serde(default)]
    pub bollinger_window: Option<usize>,
    #[serde(default)]
    pub atr_window: Option<usize>,
}

impl AnalysisParams {
    /// Build server-level parameters: built-in defaults overridden by
    /// `MERIDIAN_*` environment variables. Fails fast on a value that does
    /// not parse or does not validate.
    pub fn from_env() -> Result<Self> {
        let mut params = Self::default();
        params.ma_short_window = env_window("MERIDIAN_MA_SHORT_WINDOW", params.ma_short_window)?;
        params.ma_medium_window =
            env_window("MERIDIAN_MA_MEDIUM_WINDOW", params.ma_medium_window)?;
        params.ma_long_window = env_window("MERIDIAN_MA_LONG_WINDOW", params.ma_long_window)?;
        params.rsi_window = env_window("MERIDIAN_RSI_WINDOW", params.rsi_window)?;
        params.bollinger_window =
            env_window("MERIDIAN_BOLLINGER_WINDOW", params.bollinger_window)?;
        params.atr_window = env_window("MERIDIAN_ATR_WINDOW", params.atr_window)?;
        params.validate()?;
        Ok(params)
    }

    /// Apply per-request overrides on top of these parameters. The caller
    /// re-validates the result before computing.
    pub fn with_overrides(&self, overrides: &WindowOverrides) -> Self {
        let mut params = self.clone();
        if let Some(w) = overrides.ma_short_window {
            params.ma_short_window = w;
        }
        if let Some(w) = overrides.ma_medium_window {
            params.ma_medium_window = w;
        }
        if let Some(w) = overrides.ma_long_window {
            params.ma_long_window = w;
        }
        if let Some(w) = overrides.rsi_window {
            params.rsi_window = w;
        }
        if let Some(w) = overrides.bollinger_window {
            params.bollinger_window = w;
        }
        if let Some(w) = overrides.atr_window {
            params.atr_window = w;
        }
        params
    }

    /// Reject any non-positive window or degenerate span combination.
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("ma_short_window", self.ma_short_window),
            ("ma_medium_window", self.ma_medium_window),
            ("ma_long_window", self.ma_long_window),
            ("rsi_window", self.rsi_window),
            ("bollinger_window", self.bollinger_window),
            ("atr_window", self.atr_window),
            ("macd_fast_span", self.macd_fast_span),
            ("macd_slow_span", self.macd_slow_span),
            ("macd_signal_span", self.macd_signal_span),
            ("roc_window", self.roc_window),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(AnalysisError::Configuration(format!(
                    "{name} must be a positive integer, got {value}"
                )));
            }
        }
        if self.macd_fast_span >= self.macd_slow_span {
            return Err(AnalysisError::Configuration(format!(
                "macd_fast_span ({}) must be smaller than macd_slow_span ({})",
                self.macd_fast_span, self.macd_slow_span
            )));
        }
        if !self.bollinger_std.is_finite() || self.bollinger_std <= 0.0 {
            return Err(AnalysisError::Configuration(format!(
                "bollinger_std must be a positive number, got {}",
                self.bollinger_std
            )));
        }
        Ok(())
    }

    /// Longest window any indicator needs before every value is defined.
    pub fn max_window(&self) -> usize {
        [
            self.ma_short_window,
            self.ma_medium_window,
            self.ma_long_window,
            self.rsi_window + 1,
            self.bollinger_window,
            self.atr_window + 1,
            self.macd_slow_span,
            self.roc_window + 1,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Read a window-sized value from the environment, falling back to
/// `default` when the variable is unset.
fn env_window(name: &str, default: usize) -> Result<usize> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<usize>().map_err(|_| {
            AnalysisError::Configuration(format!(
                "{name} must be a positive integer, got '{raw}'"
            ))
        }),
        Err(_) => Ok(default),
    }
}

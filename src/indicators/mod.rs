// =============================================================================
// Indicator Calculators
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators consumed by the
// scoring engine. Every public function returns `Option<T>` so callers are
// forced to handle insufficient-data and numerical-edge-case scenarios —
// an undefined indicator is `None`, never a zero pretending to be a value.

pub mod atr;
pub mod bollinger;
pub mod ma;
pub mod macd;
pub mod roc;
pub mod rsi;
pub mod volume;

use serde::Serialize;

use crate::config::AnalysisParams;
use crate::series::Series;

use self::ma::TrendAlignment;
use self::macd::MacdCross;
use self::volume::VolumeSignal;

/// Every indicator evaluated at the latest bar of a series.
///
/// `None` serialises to JSON `null` — the explicit "not available" marker of
/// the output contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub ma_short: Option<f64>,
    pub ma_medium: Option<f64>,
    pub ma_long: Option<f64>,
    pub trend: TrendAlignment,
    pub rsi: Option<f64>,
    pub macd_dif: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub macd_cross: Option<MacdCross>,
    pub boll_upper: Option<f64>,
    pub boll_middle: Option<f64>,
    pub boll_lower: Option<f64>,
    /// (close - lower) / (upper - lower), clamped to [0, 1]. `None` when the
    /// bands are undefined or collapsed.
    pub boll_position: Option<f64>,
    pub atr: Option<f64>,
    /// ATR as a percentage of the latest close.
    pub volatility_pct: Option<f64>,
    pub roc: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub volume_signal: Option<VolumeSignal>,
}

/// Evaluate all indicator families against the latest bar of `series`.
///
/// Deterministic: identical series and parameters produce identical output,
/// bit for bit.
pub fn compute_indicators(series: &Series, params: &AnalysisParams) -> IndicatorSet {
    let closes = series.closes();
    let volumes = series.volumes();
    let latest_close = series.latest().close;

    let ma_short = ma::calculate_sma(&closes, params.ma_short_window);
    let ma_medium = ma::calculate_sma(&closes, params.ma_medium_window);
    let ma_long = ma::calculate_sma(&closes, params.ma_long_window);
    let trend = ma::ma_alignment(ma_short, ma_medium, ma_long);

    let rsi = rsi::current_rsi(&closes, params.rsi_window);

    let macd = macd::calculate_macd(
        &closes,
        params.macd_fast_span,
        params.macd_slow_span,
        params.macd_signal_span,
    );

    let bands = bollinger::calculate_bollinger(&closes, params.bollinger_window, params.bollinger_std);
    let boll_position = bands
        .as_ref()
        .and_then(|b| bollinger::band_position(latest_close, b));

    let atr = atr::calculate_atr(series.bars(), params.atr_window);
    let volatility_pct = atr::volatility_pct(series.bars(), params.atr_window);

    let roc = roc::current_roc(&closes, params.roc_window);

    // The volume ratio shares the medium MA window.
    let volume_ratio = volume::volume_ratio(&volumes, params.ma_medium_window);
    let volume_signal = volume_ratio
        .map(|r| volume::classify_ratio(r, params.volume_high_ratio, params.volume_low_ratio));

    IndicatorSet {
        ma_short,
        ma_medium,
        ma_long,
        trend,
        rsi,
        macd_dif: macd.map(|m| m.dif),
        macd_signal: macd.map(|m| m.signal),
        macd_histogram: macd.map(|m| m.histogram),
        macd_cross: macd.and_then(|m| m.cross),
        boll_upper: bands.map(|b| b.upper),
        boll_middle: bands.map(|b| b.middle),
        boll_lower: bands.map(|b| b.lower),
        boll_position,
        atr,
        volatility_pct,
        roc,
        volume_ratio,
        volume_signal,
    }
}

// =============================================================================
// Report Assembly
// =============================================================================
//
// The report is the single output of an analysis run: instrument identity,
// headline price facts, the full indicator set, the score breakdown, a short
// plain-language technical summary, and the five most recent bars for
// context. Everything in it is derived from the series and parameters — no
// clock reads, no randomness.

use serde::Serialize;

use crate::indicators::ma::TrendAlignment;
use crate::indicators::volume::VolumeSignal;
use crate::indicators::IndicatorSet;
use crate::scoring::ScoreBreakdown;
use crate::series::{PriceBar, Series};
use crate::types::{MarketType, RecommendationTier};

/// How many trailing bars the report echoes back.
pub const RECENT_BARS: usize = 5;

/// Plain-language reading of the headline indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSummary {
    pub trend: TrendAlignment,
    /// "oversold" / "neutral" / "overbought", or `None` when RSI is undefined.
    pub rsi_level: Option<&'static str>,
    /// ATR as a percentage of the latest close.
    pub volatility_pct: Option<f64>,
    pub volume_trend: Option<VolumeSignal>,
}

/// The complete, serialisable result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub instrument_code: String,
    pub market_type: MarketType,
    /// Date of the latest bar in the normalized series.
    pub as_of_date: String,
    pub latest_price: f64,
    /// Close-over-close change against the previous bar, in percent.
    pub price_change_pct: f64,
    pub indicators: IndicatorSet,
    pub score_breakdown: ScoreBreakdown,
    pub score: u8,
    pub recommendation: RecommendationTier,
    pub technical_summary: TechnicalSummary,
    pub recent_bars: Vec<PriceBar>,
}

/// Assemble the final report from the already-computed pipeline stages.
pub fn assemble_report(
    instrument_code: &str,
    market_type: MarketType,
    series: &Series,
    indicators: IndicatorSet,
    breakdown: ScoreBreakdown,
) -> AnalysisReport {
    let latest = series.latest();
    let previous = series.previous();

    let price_change_pct = if previous.close > 0.0 {
        (latest.close - previous.close) / previous.close * 100.0
    } else {
        0.0
    };

    let technical_summary = TechnicalSummary {
        trend: indicators.trend,
        rsi_level: indicators.rsi.map(rsi_level),
        volatility_pct: indicators.volatility_pct,
        volume_trend: indicators.volume_signal,
    };

    AnalysisReport {
        instrument_code: instrument_code.to_string(),
        market_type,
        as_of_date: latest.date.format("%Y-%m-%d").to_string(),
        latest_price: latest.close,
        price_change_pct,
        score: breakdown.score,
        recommendation: breakdown.recommendation,
        technical_summary,
        recent_bars: series.recent(RECENT_BARS).to_vec(),
        indicators,
        score_breakdown: breakdown,
    }
}

/// Bucket an RSI value into the conventional three-level reading.
fn rsi_level(rsi: f64) -> &'static str {
    if rsi < 30.0 {
        "oversold"
    } else if rsi > 70.0 {
        "overbought"
    } else {
        "neutral"
    }
}

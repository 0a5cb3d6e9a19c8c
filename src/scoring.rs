// =============================================================================
// Scoring Engine — weighted multi-factor composite
// =============================================================================
//
// Five independent factors, each a signed contribution on a fixed scale,
// summed onto a neutral baseline of 50 and clamped to [0, 100]:
//
//   trend      ±trend weight   strict MA alignment
//   rsi        ±rsi weight     contrarian band: oversold adds, overbought
//                              subtracts, linear between the anchors
//   macd       ±cross weight   fresh golden/death cross; histogram sign
//                              alone contributes ±histogram weight
//   bollinger  ±boll weight    near the lower band adds, near the upper
//                              subtracts, linear between
//   volume     ±volume weight  amplifies the trend factor's sign on high
//                              volume, dampens it on low volume
//
// A factor whose indicator is undefined contributes exactly 0 — neutral by
// policy, so short histories still produce a report skewed toward the
// neutral band. This is one of the two deliberate fallbacks in the engine
// (the other is RSI's avg-loss-0 branch).
// =============================================================================

use serde::Serialize;

use crate::config::ScoreWeights;
use crate::indicators::ma::TrendAlignment;
use crate::indicators::macd::MacdCross;
use crate::indicators::volume::VolumeSignal;
use crate::indicators::IndicatorSet;
use crate::types::RecommendationTier;

/// The score every factor is summed onto before clamping.
pub const NEUTRAL_BASELINE: f64 = 50.0;

/// One factor's signed contribution to the composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub name: &'static str,
    pub contribution: f64,
}

/// The fully evaluated score: per-factor contributions, the clamped
/// composite, the rounded integer score, and the recommendation tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub factors: Vec<FactorContribution>,
    /// Baseline plus factor sum, clamped to [0, 100], before rounding.
    pub composite: f64,
    /// `composite` rounded half-up to an integer.
    pub score: u8,
    pub recommendation: RecommendationTier,
}

/// Combine an indicator set into a `ScoreBreakdown`.
///
/// Deterministic and total: every `IndicatorSet` produces a score; missing
/// indicators contribute 0, they never fail the computation.
pub fn calculate_score(indicators: &IndicatorSet, weights: &ScoreWeights) -> ScoreBreakdown {
    let trend = trend_factor(indicators.trend, weights);
    let rsi = rsi_factor(indicators.rsi, weights);
    let macd = macd_factor(indicators.macd_histogram, indicators.macd_cross, weights);
    let bollinger = bollinger_factor(indicators.boll_position, weights);
    let volume = volume_factor(trend, indicators.volume_signal, weights);

    let factors = vec![
        FactorContribution { name: "trend", contribution: trend },
        FactorContribution { name: "rsi", contribution: rsi },
        FactorContribution { name: "macd", contribution: macd },
        FactorContribution { name: "bollinger", contribution: bollinger },
        FactorContribution { name: "volume", contribution: volume },
    ];

    let sum: f64 = factors.iter().map(|f| f.contribution).sum();
    let composite = (NEUTRAL_BASELINE + sum).clamp(0.0, 100.0);
    let score = round_half_up(composite);

    ScoreBreakdown {
        factors,
        composite,
        score,
        recommendation: RecommendationTier::from_score(score),
    }
}

// =============================================================================
// Individual factors
// =============================================================================

fn trend_factor(trend: TrendAlignment, weights: &ScoreWeights) -> f64 {
    match trend {
        TrendAlignment::Bullish => weights.trend,
        TrendAlignment::Bearish => -weights.trend,
        TrendAlignment::Mixed => 0.0,
    }
}

/// Contrarian RSI band: full positive contribution below the oversold
/// anchor, zero inside the neutral band, full negative above overbought,
/// linear in between. Monotone non-increasing in RSI.
fn rsi_factor(rsi: Option<f64>, weights: &ScoreWeights) -> f64 {
    let rsi = match rsi {
        Some(v) => v,
        None => return 0.0,
    };
    let w = weights.rsi;

    if rsi < weights.rsi_oversold {
        w
    } else if rsi <= weights.rsi_neutral_low {
        let span = weights.rsi_neutral_low - weights.rsi_oversold;
        if span > 0.0 {
            w * (weights.rsi_neutral_low - rsi) / span
        } else {
            0.0
        }
    } else if rsi < weights.rsi_neutral_high {
        0.0
    } else if rsi <= weights.rsi_overbought {
        let span = weights.rsi_overbought - weights.rsi_neutral_high;
        if span > 0.0 {
            -w * (rsi - weights.rsi_neutral_high) / span
        } else {
            0.0
        }
    } else {
        -w
    }
}

fn macd_factor(
    histogram: Option<f64>,
    cross: Option<MacdCross>,
    weights: &ScoreWeights,
) -> f64 {
    let histogram = match histogram {
        Some(v) => v,
        None => return 0.0,
    };
    match cross {
        Some(MacdCross::Golden) if histogram > 0.0 => weights.macd_cross,
        Some(MacdCross::Death) if histogram < 0.0 => -weights.macd_cross,
        _ => {
            if histogram > 0.0 {
                weights.macd_histogram
            } else if histogram < 0.0 {
                -weights.macd_histogram
            } else {
                0.0
            }
        }
    }
}

/// Linear from full positive at the low anchor to full negative at the high
/// anchor. Zero when the band position is undefined (collapsed bands).
fn bollinger_factor(position: Option<f64>, weights: &ScoreWeights) -> f64 {
    let position = match position {
        Some(p) => p,
        None => return 0.0,
    };
    let w = weights.bollinger;
    let low = weights.bollinger_low_position;
    let high = weights.bollinger_high_position;

    if position < low {
        w
    } else if position > high {
        -w
    } else {
        let span = high - low;
        if span > 0.0 {
            w - 2.0 * w * (position - low) / span
        } else {
            0.0
        }
    }
}

/// Volume confirms or questions the trend: high participation amplifies the
/// trend factor's sign, low participation dampens it. Without a directional
/// trend there is nothing to confirm.
fn volume_factor(
    trend_contribution: f64,
    signal: Option<VolumeSignal>,
    weights: &ScoreWeights,
) -> f64 {
    if trend_contribution == 0.0 {
        return 0.0;
    }
    let direction = trend_contribution.signum();
    match signal {
        Some(VolumeSignal::High) => direction * weights.volume,
        Some(VolumeSignal::Low) => -direction * weights.volume,
        Some(VolumeSignal::Normal) | None => 0.0,
    }
}

/// Round to the nearest integer, halves away from zero toward +inf.
/// The input is already clamped to [0, 100].
fn round_half_up(value: f64) -> u8 {
    (value + 0.5).floor() as u8
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn null_indicators() -> IndicatorSet {
        IndicatorSet {
            ma_short: None,
            ma_medium: None,
            ma_long: None,
            trend: TrendAlignment::Mixed,
            rsi: None,
            macd_dif: None,
            macd_signal: None,
            macd_histogram: None,
            macd_cross: None,
            boll_upper: None,
            boll_middle: None,
            boll_lower: None,
            boll_position: None,
            atr: None,
            volatility_pct: None,
            roc: None,
            volume_ratio: None,
            volume_signal: None,
        }
    }

    fn weights() -> ScoreWeights {
        ScoreWeights::default()
    }

    // ---- composite ---------------------------------------------------------

    #[test]
    fn all_null_scores_neutral_hold() {
        let breakdown = calculate_score(&null_indicators(), &weights());
        assert_eq!(breakdown.score, 50);
        assert_eq!(breakdown.recommendation, RecommendationTier::Hold);
        for f in &breakdown.factors {
            assert_eq!(f.contribution, 0.0, "factor {} not neutral", f.name);
        }
    }

    #[test]
    fn maximally_bullish_clamps_to_100() {
        let mut ind = null_indicators();
        ind.trend = TrendAlignment::Bullish;
        ind.rsi = Some(10.0);
        ind.macd_histogram = Some(1.0);
        ind.macd_cross = Some(MacdCross::Golden);
        ind.boll_position = Some(0.05);
        ind.volume_signal = Some(VolumeSignal::High);

        // 50 + 15 + 10 + 15 + 10 + 5 = 105 -> clamp 100.
        let breakdown = calculate_score(&ind, &weights());
        assert_eq!(breakdown.score, 100);
        assert_eq!(breakdown.recommendation, RecommendationTier::StrongBuy);
    }

    #[test]
    fn maximally_bearish_clamps_to_0() {
        let mut ind = null_indicators();
        ind.trend = TrendAlignment::Bearish;
        ind.rsi = Some(95.0);
        ind.macd_histogram = Some(-1.0);
        ind.macd_cross = Some(MacdCross::Death);
        ind.boll_position = Some(0.95);
        ind.volume_signal = Some(VolumeSignal::High);

        // 50 - 15 - 10 - 15 - 10 - 5 = -5 -> clamp 0.
        let breakdown = calculate_score(&ind, &weights());
        assert_eq!(breakdown.score, 0);
        assert_eq!(breakdown.recommendation, RecommendationTier::StrongSell);
    }

    #[test]
    fn score_is_always_in_range() {
        // Sweep a grid of factor states; the integer score must stay in
        // [0, 100] with the tier matching.
        let trends = [TrendAlignment::Bullish, TrendAlignment::Bearish, TrendAlignment::Mixed];
        let rsis = [None, Some(0.0), Some(35.0), Some(50.0), Some(65.0), Some(100.0)];
        let positions = [None, Some(0.0), Some(0.5), Some(1.0)];
        let volumes = [None, Some(VolumeSignal::High), Some(VolumeSignal::Low)];

        for &trend in &trends {
            for &rsi in &rsis {
                for &pos in &positions {
                    for &vol in &volumes {
                        let mut ind = null_indicators();
                        ind.trend = trend;
                        ind.rsi = rsi;
                        ind.boll_position = pos;
                        ind.volume_signal = vol;
                        let b = calculate_score(&ind, &weights());
                        assert!(b.score <= 100);
                        assert_eq!(b.recommendation, RecommendationTier::from_score(b.score));
                    }
                }
            }
        }
    }

    #[test]
    fn composite_rounds_half_up() {
        let mut w = weights();
        w.trend = 0.5;
        let mut ind = null_indicators();
        ind.trend = TrendAlignment::Bullish;
        // 50 + 0.5 = 50.5 -> 51.
        assert_eq!(calculate_score(&ind, &w).score, 51);

        ind.trend = TrendAlignment::Bearish;
        // 50 - 0.5 = 49.5 -> 50.
        assert_eq!(calculate_score(&ind, &w).score, 50);
    }

    #[test]
    fn identical_input_gives_identical_breakdown() {
        let mut ind = null_indicators();
        ind.trend = TrendAlignment::Bullish;
        ind.rsi = Some(37.2);
        ind.boll_position = Some(0.43);
        let a = calculate_score(&ind, &weights());
        let b = calculate_score(&ind, &weights());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    // ---- trend -------------------------------------------------------------

    #[test]
    fn trend_factor_signs() {
        let w = weights();
        assert_eq!(trend_factor(TrendAlignment::Bullish, &w), 15.0);
        assert_eq!(trend_factor(TrendAlignment::Bearish, &w), -15.0);
        assert_eq!(trend_factor(TrendAlignment::Mixed, &w), 0.0);
    }

    // ---- rsi ---------------------------------------------------------------

    #[test]
    fn rsi_factor_anchor_values() {
        let w = weights();
        assert_eq!(rsi_factor(Some(20.0), &w), 10.0); // oversold
        assert_eq!(rsi_factor(Some(50.0), &w), 0.0); // neutral band
        assert_eq!(rsi_factor(Some(45.0), &w), 0.0); // neutral edge
        assert_eq!(rsi_factor(Some(90.0), &w), -10.0); // overbought
        assert_eq!(rsi_factor(None, &w), 0.0);
    }

    #[test]
    fn rsi_factor_interpolates_linearly() {
        let w = weights();
        // Midpoint of [30, 45] -> half of +10.
        assert!((rsi_factor(Some(37.5), &w) - 5.0).abs() < 1e-10);
        // Midpoint of [55, 70] -> half of -10.
        assert!((rsi_factor(Some(62.5), &w) + 5.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_factor_is_monotone_nonincreasing() {
        // Decreasing RSI from 50 toward 0 never decreases the contribution.
        let w = weights();
        let mut prev = f64::NEG_INFINITY;
        for i in (0..=500).rev() {
            let rsi = i as f64 / 5.0; // 100.0 down to 0.0
            let c = rsi_factor(Some(rsi), &w);
            assert!(
                c + 1e-12 >= prev,
                "contribution decreased at rsi={rsi}: {c} < {prev}"
            );
            prev = c;
        }
    }

    // ---- macd --------------------------------------------------------------

    #[test]
    fn macd_factor_fresh_cross_dominates() {
        let w = weights();
        assert_eq!(macd_factor(Some(0.8), Some(MacdCross::Golden), &w), 15.0);
        assert_eq!(macd_factor(Some(-0.8), Some(MacdCross::Death), &w), -15.0);
    }

    #[test]
    fn macd_factor_histogram_sign_alone() {
        let w = weights();
        assert_eq!(macd_factor(Some(0.8), None, &w), 5.0);
        assert_eq!(macd_factor(Some(-0.8), None, &w), -5.0);
        assert_eq!(macd_factor(Some(0.0), None, &w), 0.0);
        assert_eq!(macd_factor(None, None, &w), 0.0);
    }

    // ---- bollinger ---------------------------------------------------------

    #[test]
    fn bollinger_factor_anchor_values() {
        let w = weights();
        assert_eq!(bollinger_factor(Some(0.1), &w), 10.0);
        assert_eq!(bollinger_factor(Some(0.9), &w), -10.0);
        assert!((bollinger_factor(Some(0.5), &w)).abs() < 1e-10);
        assert_eq!(bollinger_factor(None, &w), 0.0);
    }

    #[test]
    fn bollinger_factor_interpolates() {
        let w = weights();
        // Quarter of the way from 0.2 to 0.8 -> +5.
        assert!((bollinger_factor(Some(0.35), &w) - 5.0).abs() < 1e-10);
        assert!((bollinger_factor(Some(0.65), &w) + 5.0).abs() < 1e-10);
    }

    // ---- volume ------------------------------------------------------------

    #[test]
    fn volume_factor_amplifies_and_dampens() {
        let w = weights();
        assert_eq!(volume_factor(15.0, Some(VolumeSignal::High), &w), 5.0);
        assert_eq!(volume_factor(15.0, Some(VolumeSignal::Low), &w), -5.0);
        assert_eq!(volume_factor(-15.0, Some(VolumeSignal::High), &w), -5.0);
        assert_eq!(volume_factor(-15.0, Some(VolumeSignal::Low), &w), 5.0);
    }

    #[test]
    fn volume_factor_neutral_cases() {
        let w = weights();
        assert_eq!(volume_factor(0.0, Some(VolumeSignal::High), &w), 0.0);
        assert_eq!(volume_factor(15.0, Some(VolumeSignal::Normal), &w), 0.0);
        assert_eq!(volume_factor(15.0, None, &w), 0.0);
    }
}

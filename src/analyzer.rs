// =============================================================================
// Analysis Pipeline
// =============================================================================
//
// Glue for the four pure stages: validate parameters, normalize the raw
// bars, evaluate the indicator set, score it, and assemble the report.
// No I/O happens here; fetching bars is the provider's job.

use tracing::debug;

use crate::config::AnalysisParams;
use crate::errors::Result;
use crate::indicators::compute_indicators;
use crate::report::{assemble_report, AnalysisReport};
use crate::scoring::calculate_score;
use crate::series::{normalize, RawBar};
use crate::types::MarketType;

/// Run the full pipeline over raw provider bars.
///
/// Deterministic: the same bars and parameters always produce the same
/// report, bit for bit.
pub fn analyze_series(
    instrument_code: &str,
    market_type: MarketType,
    raw: &[RawBar],
    params: &AnalysisParams,
) -> Result<AnalysisReport> {
    params.validate()?;
    let series = normalize(raw)?;
    debug!(
        instrument = instrument_code,
        bars = series.len(),
        "normalized series"
    );

    let indicators = compute_indicators(&series, params);
    let breakdown = calculate_score(&indicators, &params.weights);

    Ok(assemble_report(
        instrument_code,
        market_type,
        &series,
        indicators,
        breakdown,
    ))
}

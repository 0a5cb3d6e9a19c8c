// =============================================================================
// Price Series — validation, deduplication, chronological ordering
// =============================================================================
//
// The upstream provider returns bar records in whatever order and shape the
// exchange happened to emit them: duplicates, out-of-order rows, partial or
// oddly formatted dates. Everything downstream of this module assumes a
// `Series` whose bars are strictly ascending by date with positive closes,
// so all cleaning happens here, once.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AnalysisError, Result};

/// A bar exactly as delivered by the data source. Dates arrive as strings
/// (`YYYYMMDD` or ISO `YYYY-MM-DD`); numeric fields may be absent or junk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBar {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub open: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    #[serde(default)]
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// A validated daily observation. Immutable once ingested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// An ordered sequence of `PriceBar`, strictly increasing by date.
///
/// Calendar gaps are tolerated, never interpolated. Length is always >= 2;
/// indicators that need longer windows signal their own insufficiency by
/// returning `None` instead.
#[derive(Debug, Clone)]
pub struct Series {
    bars: Vec<PriceBar>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// The most recent bar. The >= 2 invariant makes this infallible.
    pub fn latest(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    /// The bar before the most recent one.
    pub fn previous(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 2]
    }

    /// The chronologically last `n` bars (fewer if the series is shorter).
    pub fn recent(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Build a `Series` directly from validated bars. Test-oriented helper;
    /// production code goes through [`normalize`].
    pub fn from_bars(bars: Vec<PriceBar>) -> Result<Self> {
        if bars.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least 2 bars, got {}",
                bars.len()
            )));
        }
        Ok(Self { bars })
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Validate and normalize raw provider output into a `Series`.
///
/// Rules:
/// - Bars with close <= 0, non-finite numerics, negative open/high/low/volume
///   or an unparseable date are dropped.
/// - Duplicates by date keep the latest-seen record.
/// - The result is sorted ascending by date.
///
/// Errors:
/// - `MalformedBar` when the input was non-empty but zero bars survived —
///   the payload itself is garbage, a client-input failure.
/// - `InsufficientData` when fewer than 2 valid bars remain.
pub fn normalize(raw: &[RawBar]) -> Result<Series> {
    // BTreeMap gives both dedup-by-date (later insert wins) and ascending
    // iteration in one pass.
    let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
    let mut dropped = 0usize;

    for bar in raw {
        match validate_bar(bar) {
            Some(valid) => {
                by_date.insert(valid.date, valid);
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, total = raw.len(), "dropped invalid bars during normalization");
    }

    if by_date.is_empty() && !raw.is_empty() {
        return Err(AnalysisError::MalformedBar(format!(
            "all {} input bars failed validation",
            raw.len()
        )));
    }

    if by_date.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "only {} valid bars after normalization, need at least 2",
            by_date.len()
        )));
    }

    Ok(Series {
        bars: by_date.into_values().collect(),
    })
}

/// Parse and sanity-check a single raw bar. `None` means "drop it".
fn validate_bar(bar: &RawBar) -> Option<PriceBar> {
    let date = parse_bar_date(&bar.date)?;

    let fields = [bar.open, bar.high, bar.low, bar.close, bar.volume];
    if fields.iter().any(|v| !v.is_finite()) {
        return None;
    }
    if bar.close <= 0.0 {
        return None;
    }
    if bar.open < 0.0 || bar.high < 0.0 || bar.low < 0.0 || bar.volume < 0.0 {
        return None;
    }

    Some(PriceBar {
        date,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: bar.volume,
    })
}

/// Accepts compact `YYYYMMDD` and ISO `YYYY-MM-DD` dates.
pub fn parse_bar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, close: f64) -> RawBar {
        RawBar {
            date: date.to_string(),
            open: close,
            high: close + 1.0,
            low: (close - 1.0).max(0.0),
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn parses_compact_and_iso_dates() {
        assert_eq!(
            parse_bar_date("20240105"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_bar_date("2024-01-05"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert!(parse_bar_date("").is_none());
        assert!(parse_bar_date("05/01/2024").is_none());
        assert!(parse_bar_date("20241340").is_none());
    }

    #[test]
    fn sorts_out_of_order_input() {
        let input = vec![raw("20240103", 3.0), raw("20240101", 1.0), raw("20240102", 2.0)];
        let series = normalize(&input).unwrap();
        let dates: Vec<_> = series.bars().iter().map(|b| b.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
    }

    #[test]
    fn dedup_keeps_latest_seen() {
        let mut first = raw("20240101", 10.0);
        first.volume = 111.0;
        let mut second = raw("20240101", 20.0);
        second.volume = 222.0;
        let input = vec![first, second, raw("20240102", 30.0)];

        let series = normalize(&input).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].close, 20.0);
        assert_eq!(series.bars()[0].volume, 222.0);
    }

    #[test]
    fn drops_nonpositive_close_and_bad_dates() {
        let input = vec![
            raw("20240101", 1.0),
            raw("20240102", 0.0),  // close <= 0 — dropped
            raw("20240103", -5.0), // negative close — dropped
            raw("", 4.0),          // missing date — dropped
            raw("20240105", 5.0),
        ];
        let series = normalize(&input).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().close, 5.0);
    }

    #[test]
    fn drops_non_finite_fields() {
        let mut bad = raw("20240102", 2.0);
        bad.high = f64::NAN;
        let input = vec![raw("20240101", 1.0), bad, raw("20240103", 3.0)];
        let series = normalize(&input).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn all_invalid_input_is_malformed() {
        let input = vec![raw("", 1.0), raw("20240101", -1.0)];
        let err = normalize(&input).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedBar(_)));
    }

    #[test]
    fn single_valid_bar_is_insufficient() {
        let input = vec![raw("20240101", 1.0), raw("bad-date", 2.0)];
        let err = normalize(&input).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn empty_input_is_insufficient() {
        let err = normalize(&[]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn recent_clamps_to_series_length() {
        let input = vec![raw("20240101", 1.0), raw("20240102", 2.0)];
        let series = normalize(&input).unwrap();
        assert_eq!(series.recent(5).len(), 2);
        assert_eq!(series.recent(1)[0].close, 2.0);
    }

    #[test]
    fn latest_and_previous() {
        let input = vec![raw("20240101", 1.0), raw("20240102", 2.0), raw("20240103", 3.0)];
        let series = normalize(&input).unwrap();
        assert_eq!(series.latest().close, 3.0);
        assert_eq!(series.previous().close, 2.0);
    }
}

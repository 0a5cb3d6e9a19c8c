// =============================================================================
// Bar Provider — upstream daily market data over HTTP
// =============================================================================
//
// The only I/O in the system. The provider fetches raw daily bars for an
// instrument and hands them to the pure pipeline untouched; all cleaning
// happens in the series normalizer.

use std::time::Duration;

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::errors::{AnalysisError, Result};
use crate::series::RawBar;
use crate::types::MarketType;

/// Default look-back when the caller supplies no date range.
pub const DEFAULT_LOOKBACK_DAYS: u64 = 365;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the daily-bar endpoint of the configured data service.
#[derive(Debug, Clone)]
pub struct BarProvider {
    http: reqwest::Client,
    base_url: String,
}

impl BarProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build from `MERIDIAN_DATA_URL`. Missing variable is a configuration
    /// failure — there is no sensible built-in upstream.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("MERIDIAN_DATA_URL").map_err(|_| {
            AnalysisError::Configuration("MERIDIAN_DATA_URL is not set".to_string())
        })?;
        Self::new(base_url)
    }

    /// Fetch daily bars for `[start, end]` inclusive. The response body is a
    /// JSON array of raw bar records; decoding failures are surfaced as
    /// `Decode`, transport/status failures as `DataSource`.
    pub async fn fetch_daily_bars(
        &self,
        instrument_code: &str,
        market_type: MarketType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>> {
        let url = format!("{}/api/daily", self.base_url);
        let market = market_type.to_string();
        let start = start.format("%Y%m%d").to_string();
        let end = end.format("%Y%m%d").to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("code", instrument_code),
                ("market", market.as_str()),
                ("start", start.as_str()),
                ("end", end.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let bars: Vec<RawBar> = serde_json::from_str(&body)?;
        debug!(
            instrument = instrument_code,
            market = %market_type,
            bars = bars.len(),
            "fetched daily bars"
        );
        Ok(bars)
    }
}

/// The `[start, end]` range used when the caller supplies none: one year
/// back from `today`, inclusive.
pub fn default_date_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
        .unwrap_or(today);
    (start, today)
}

// =============================================================================
// Instrument code validation
// =============================================================================

/// Market-specific format check, run before any fetch is attempted.
///
/// A-shares are six digits with an exchange prefix (`0`/`3` Shenzhen, `6`
/// Shanghai incl. STAR `688`, `8` Beijing). Other markets only require a
/// short alphanumeric symbol.
pub fn validate_instrument_code(code: &str, market_type: MarketType) -> Result<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AnalysisError::InvalidInstrument(
            "instrument code is empty".to_string(),
        ));
    }

    match market_type {
        MarketType::A => {
            let all_digits = code.chars().all(|c| c.is_ascii_digit());
            let valid_prefix = code.starts_with('0')
                || code.starts_with('3')
                || code.starts_with('6')
                || code.starts_with('8');
            if code.len() != 6 || !all_digits || !valid_prefix {
                return Err(AnalysisError::InvalidInstrument(format!(
                    "'{code}' is not a valid A-share code (six digits, prefix 0/3/6/8)"
                )));
            }
        }
        MarketType::HK | MarketType::US | MarketType::ETF | MarketType::LOF => {
            let alnum = code.chars().all(|c| c.is_ascii_alphanumeric());
            if code.len() < 3 || code.len() > 10 || !alnum {
                return Err(AnalysisError::InvalidInstrument(format!(
                    "'{code}' is not a valid {market_type} symbol"
                )));
            }
        }
    }
    Ok(())
}

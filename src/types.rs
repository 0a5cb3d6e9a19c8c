// =============================================================================
// Shared types used across the Meridian analysis engine
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

/// Which market convention an instrument code belongs to.
///
/// Classification only affects upstream data fetching and code validation —
/// the indicator and scoring pipeline is market-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketType {
    /// Mainland A-shares.
    A,
    /// Hong Kong equities.
    HK,
    /// US equities.
    US,
    /// Exchange-traded funds.
    ETF,
    /// Listed open-ended funds.
    LOF,
}

impl MarketType {
    /// Parse a market label, case-insensitively. `None`/empty defaults to A.
    pub fn parse(label: Option<&str>) -> Result<Self, AnalysisError> {
        let label = label.unwrap_or("A").trim();
        if label.is_empty() {
            return Ok(Self::A);
        }
        match label.to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "HK" => Ok(Self::HK),
            "US" => Ok(Self::US),
            "ETF" => Ok(Self::ETF),
            "LOF" => Ok(Self::LOF),
            other => Err(AnalysisError::InvalidInstrument(format!(
                "unsupported market type: {other}"
            ))),
        }
    }
}

impl Default for MarketType {
    fn default() -> Self {
        Self::A
    }
}

impl std::fmt::Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::HK => write!(f, "HK"),
            Self::US => write!(f, "US"),
            Self::ETF => write!(f, "ETF"),
            Self::LOF => write!(f, "LOF"),
        }
    }
}

/// Discrete recommendation derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl RecommendationTier {
    /// Map an integer composite score in [0, 100] onto a tier.
    ///
    /// Boundaries: [0,20) strong_sell, [20,40) sell, [40,60) hold,
    /// [60,80) buy, [80,100] strong_buy.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=19 => Self::StrongSell,
            20..=39 => Self::Sell,
            40..=59 => Self::Hold,
            60..=79 => Self::Buy,
            _ => Self::StrongBuy,
        }
    }

    /// Fixed wire label for the tier.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongSell => "strong_sell",
            Self::Sell => "sell",
            Self::Hold => "hold",
            Self::Buy => "buy",
            Self::StrongBuy => "strong_buy",
        }
    }
}

impl std::fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// =============================================================================
// Typed failures of the analysis pipeline
// =============================================================================
//
// Every failure is local and synchronous: the pure computation performs no
// I/O, so there is nothing to retry inside the engine. The only non-local
// variants (`DataSource`, `Decode`) originate in the upstream bar provider
// and are surfaced to the API boundary unchanged.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The raw input contained bars but none survived the sanity checks
    /// (non-positive close, unparseable date). Client-input failure.
    #[error("malformed bar data: {0}")]
    MalformedBar(String),

    /// Fewer than 2 valid bars remained after normalization. Surfaced
    /// distinctly from `MalformedBar` so callers can widen the date range.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A window parameter is non-positive. Fatal before any computation,
    /// never silently defaulted.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Instrument code fails the market-specific format check.
    #[error("invalid instrument code: {0}")]
    InvalidInstrument(String),

    /// Upstream market-data fetch failed.
    #[error("data source error: {0}")]
    DataSource(#[from] reqwest::Error),

    /// Upstream payload could not be decoded.
    #[error("data decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    /// Stable machine-readable kind label used in the API error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedBar(_) => "malformed_bar",
            Self::InsufficientData(_) => "insufficient_data",
            Self::Configuration(_) => "configuration",
            Self::InvalidInstrument(_) => "invalid_instrument",
            Self::DataSource(_) => "data_source",
            Self::Decode(_) => "data_decode",
        }
    }
}

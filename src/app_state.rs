// =============================================================================
// Central Application State — Meridian Stock Insight
// =============================================================================
//
// Everything a request handler needs: the server-level analysis parameters
// and the upstream bar provider. Both are immutable after startup, so the
// state is shared as a plain `Arc<AppState>` with no interior locking.
// =============================================================================

use crate::config::AnalysisParams;
use crate::provider::BarProvider;

/// Shared application state for the API handlers.
pub struct AppState {
    /// Server defaults; per-request overrides are applied on a clone.
    pub params: AnalysisParams,
    /// Upstream daily-bar data source.
    pub provider: BarProvider,
}

impl AppState {
    pub fn new(params: AnalysisParams, provider: BarProvider) -> Self {
        Self { params, provider }
    }
}

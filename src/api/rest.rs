// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. Health is public; the analyze
// endpoints require a valid Bearer token checked via the `AuthBearer`
// extractor. Every response is wrapped in a `success`/`error` envelope that
// carries a per-request UUID for log correlation.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analyzer::analyze_series;
use crate::api::auth::AuthBearer;
use crate::app_state::AppState;
use crate::config::WindowOverrides;
use crate::errors::{AnalysisError, Result};
use crate::provider::{default_date_range, validate_instrument_code};
use crate::report::AnalysisReport;
use crate::series::parse_bar_date;
use crate::types::MarketType;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        // ── Authenticated ───────────────────────────────────────────
        .route("/api/v1/analyze/:code", get(analyze_get))
        .route("/api/v1/analyze", post(analyze_post))
        // ── Middleware & State ──────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health (public)
// =============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "meridian-insight",
        "version": env!("CARGO_PKG_VERSION"),
        "server_time": Utc::now().timestamp_millis(),
    }))
}

// =============================================================================
// Analyze (authenticated)
// =============================================================================

#[derive(Deserialize)]
struct AnalyzeQuery {
    #[serde(default)]
    market: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

async fn analyze_get(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(query): Query<AnalyzeQuery>,
) -> Response {
    let request_id = Uuid::new_v4();
    let result = run_analysis(
        &state,
        &code,
        query.market.as_deref(),
        query.start.as_deref(),
        query.end.as_deref(),
        &WindowOverrides::default(),
    )
    .await;
    respond(request_id, &code, result)
}

/// Body of `POST /api/v1/analyze`. Window overrides are accepted inline
/// alongside the instrument fields.
#[derive(Deserialize)]
struct AnalyzeRequest {
    stock_code: String,
    #[serde(default)]
    market_type: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(flatten)]
    windows: WindowOverrides,
}

async fn analyze_post(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let request_id = Uuid::new_v4();
    let result = run_analysis(
        &state,
        &request.stock_code,
        request.market_type.as_deref(),
        request.start_date.as_deref(),
        request.end_date.as_deref(),
        &request.windows,
    )
    .await;
    respond(request_id, &request.stock_code, result)
}

/// Shared request flow: classify the market, validate the code, resolve the
/// date range, fetch bars, run the pure pipeline.
async fn run_analysis(
    state: &AppState,
    code: &str,
    market_label: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    overrides: &WindowOverrides,
) -> Result<AnalysisReport> {
    let market_type = MarketType::parse(market_label)?;
    let code = code.trim();
    validate_instrument_code(code, market_type)?;

    let params = state.params.with_overrides(overrides);
    params.validate()?;

    let (start, end) = resolve_date_range(start, end)?;
    let bars = state
        .provider
        .fetch_daily_bars(code, market_type, start, end)
        .await?;

    analyze_series(code, market_type, &bars, &params)
}

/// Missing endpoints of the range fall back to a one-year look-back ending
/// today. A supplied date that does not parse is a request error, not a
/// silent default.
fn resolve_date_range(start: Option<&str>, end: Option<&str>) -> Result<(NaiveDate, NaiveDate)> {
    let (default_start, default_end) = default_date_range(Utc::now().date_naive());
    let start = match start {
        Some(raw) => parse_request_date("start_date", raw)?,
        None => default_start,
    };
    let end = match end {
        Some(raw) => parse_request_date("end_date", raw)?,
        None => default_end,
    };
    if start > end {
        return Err(AnalysisError::Configuration(format!(
            "start_date {start} is after end_date {end}"
        )));
    }
    Ok((start, end))
}

fn parse_request_date(field: &str, raw: &str) -> Result<NaiveDate> {
    parse_bar_date(raw).ok_or_else(|| {
        AnalysisError::Configuration(format!(
            "{field} must be YYYYMMDD or YYYY-MM-DD, got '{raw}'"
        ))
    })
}

// =============================================================================
// Response envelope
// =============================================================================

fn respond(request_id: Uuid, code: &str, result: Result<AnalysisReport>) -> Response {
    match result {
        Ok(report) => {
            info!(
                request_id = %request_id,
                instrument = code,
                score = report.score,
                recommendation = %report.recommendation,
                "analysis complete"
            );
            let body = serde_json::json!({
                "success": true,
                "request_id": request_id.to_string(),
                "data": report,
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            warn!(
                request_id = %request_id,
                instrument = code,
                kind = err.kind(),
                error = %err,
                "analysis failed"
            );
            let body = serde_json::json!({
                "success": false,
                "request_id": request_id.to_string(),
                "error": { "kind": err.kind(), "message": err.to_string() },
            });
            (error_status(&err), Json(body)).into_response()
        }
    }
}

/// Stable mapping from failure kind to HTTP status.
fn error_status(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::MalformedBar(_) => StatusCode::BAD_REQUEST,
        AnalysisError::InsufficientData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::Configuration(_) => StatusCode::BAD_REQUEST,
        AnalysisError::InvalidInstrument(_) => StatusCode::BAD_REQUEST,
        AnalysisError::DataSource(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::Decode(_) => StatusCode::BAD_GATEWAY,
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_defaults_to_one_year() {
        let (start, end) = resolve_date_range(None, None).unwrap();
        assert_eq!((end - start).num_days(), 365);
    }

    #[test]
    fn date_range_accepts_both_formats() {
        let (start, end) =
            resolve_date_range(Some("20240101"), Some("2024-06-30")).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let err = resolve_date_range(Some("20240630"), Some("20240101")).unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let err = resolve_date_range(Some("June 1st"), None).unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            error_status(&AnalysisError::MalformedBar("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&AnalysisError::InsufficientData("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            error_status(&AnalysisError::Configuration("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&AnalysisError::InvalidInstrument("x".into())),
            StatusCode::BAD_REQUEST
        );
    }
}

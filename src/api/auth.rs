// =============================================================================
// Bearer Token Authentication — Axum Middleware
// =============================================================================
//
// Extracts and validates a Bearer token from the `Authorization` header, with
// a `?token=` query-parameter fallback for clients that cannot set headers.
// The accepted tokens are read from the `MERIDIAN_TOKENS` environment variable
// (comma-separated, so several clients can hold distinct credentials).
// Comparison is performed in constant time to prevent timing side-channels.
//
// Usage as an Axum extractor:
//
//   async fn handler(AuthBearer(token): AuthBearer, ...) { ... }
//
// A missing token short-circuits with 401; a presented-but-invalid token with
// 403, before the handler body executes.
// =============================================================================

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

// =============================================================================
// Constant-time comparison
// =============================================================================

/// Compare two byte slices in constant time. Returns `true` if they are
/// identical. The comparison always examines every byte of both slices even
/// when a mismatch is found early, preventing timing side-channels.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        // A length mismatch already leaks that lengths differ, which is
        // acceptable here (the attacker does not control the expected
        // token length).
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// =============================================================================
// Token set
// =============================================================================

/// The set of credentials accepted by the API.
#[derive(Debug, Clone)]
pub struct TokenSet {
    tokens: Vec<String>,
}

impl TokenSet {
    /// Parse a comma-separated token list. Blank entries are dropped.
    pub fn parse(raw: &str) -> Self {
        let tokens = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { tokens }
    }

    /// Read `MERIDIAN_TOKENS`. Called per request so token rotation does not
    /// require a restart.
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("MERIDIAN_TOKENS").unwrap_or_default())
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check `candidate` against every configured token. Always walks the
    /// whole set so the match position is not observable.
    pub fn contains(&self, candidate: &str) -> bool {
        let mut found = false;
        for token in &self.tokens {
            found |= constant_time_eq(candidate.as_bytes(), token.as_bytes());
        }
        found
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Axum extractor that validates a Bearer token (or `?token=` fallback)
/// against the `MERIDIAN_TOKENS` environment variable.
///
/// On success it yields the raw token string for downstream audit logging.
pub struct AuthBearer(pub String);

/// Rejection type returned when authentication fails.
pub struct AuthRejection {
    status: StatusCode,
    message: &'static str,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "error": { "kind": "unauthorized", "message": self.message },
        });
        (self.status, axum::Json(body)).into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthBearer
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accepted = TokenSet::from_env();

        if accepted.is_empty() {
            warn!("MERIDIAN_TOKENS is not set — all authenticated requests will be rejected");
            return Err(AuthRejection {
                status: StatusCode::FORBIDDEN,
                message: "Server authentication not configured",
            });
        }

        let token = match bearer_from_header(parts).or_else(|| token_from_query(parts)) {
            Some(token) => token,
            None => {
                warn!("No credentials presented");
                return Err(AuthRejection {
                    status: StatusCode::UNAUTHORIZED,
                    message: "Missing authorization token",
                });
            }
        };

        if !accepted.contains(&token) {
            warn!("Invalid token presented");
            return Err(AuthRejection {
                status: StatusCode::FORBIDDEN,
                message: "Invalid authorization token",
            });
        }

        Ok(AuthBearer(token))
    }
}

fn bearer_from_header(parts: &Parts) -> Option<String> {
    let value = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    value.strip_prefix("Bearer ").map(str::to_string)
}

/// `?token=...` fallback for GET clients that cannot set headers.
fn token_from_query(parts: &Parts) -> Option<String> {
    let query = parts.uri.query()?;
    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("token=") {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

// =============================================================================
// Tests
// =============================================================================

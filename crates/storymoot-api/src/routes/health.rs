//! Liveness of the governance engine.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

const SERVICE: &str = "storymoot-governance";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `unavailable` once the engine lock is poisoned.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Number of registered rule masters, when the engine is readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_masters: Option<usize>,
}

/// `GET /health`
///
/// Reports 503 when a writer panicked while holding the engine lock, since
/// every command and query would then fail.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let rule_masters = match state.engine.read() {
        Ok(engine) => Some(engine.rule_masters().len()),
        Err(e) => {
            warn!(error = %e, "engine lock poisoned");
            None
        }
    };
    let (status, label) = match rule_masters {
        Some(_) => (StatusCode::OK, "ok"),
        None => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
    };

    let body = HealthResponse {
        status: label,
        service: SERVICE,
        version: env!("CARGO_PKG_VERSION"),
        rule_masters,
    };
    (status, Json(body))
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

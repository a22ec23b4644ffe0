//! Storymoot API — HTTP transport for the governance engine.

use axum::Router;

pub mod caller;
pub mod config;
pub mod error;
pub mod notifications;
pub mod routes;
pub mod state;

/// Builds the application router over `state`.
pub fn app(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/rule-masters", routes::rule_masters::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .nest("/api/v1/proposals", routes::proposals::router())
        .with_state(state)
}

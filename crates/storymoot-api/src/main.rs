//! Storymoot API server entry point.

use std::sync::Arc;

use storymoot_api::config::ServerConfig;
use storymoot_api::error::AppError;
use storymoot_api::notifications::log_notifications;
use storymoot_api::state::AppState;
use storymoot_core::clock::SystemClock;
use storymoot_core::notification::BroadcastNotificationSink;
use storymoot_governance::application::engine::GovernanceEngine;
use storymoot_governance::domain::events::GovernanceEvent;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Storymoot governance API server");

    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr()?;

    // Wire the notification channel before the engine can emit anything.
    let sink = Arc::new(BroadcastNotificationSink::<GovernanceEvent>::new(
        config.notification_capacity,
    ));
    tokio::spawn(log_notifications(sink.subscribe()));

    let engine = GovernanceEngine::new(config.owner.clone(), Arc::new(SystemClock), sink);
    tracing::info!(owner = %config.owner, "governance engine bootstrapped");

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = storymoot_api::app(AppState::new(engine))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use storymoot_api::caller::CALLER_HEADER;
use storymoot_api::state::AppState;
use storymoot_core::account::AccountId;
use storymoot_governance::application::engine::GovernanceEngine;
use storymoot_governance::domain::events::GovernanceEvent;
use storymoot_test_support::{ManualClock, RecordingNotificationSink};
use tower::ServiceExt;

/// Fixed start time used across all integration tests.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// A running app plus handles on its clock and notification sink.
pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub sink: Arc<RecordingNotificationSink<GovernanceEvent>>,
}

impl TestApp {
    /// Build the full app router over an engine owned by `owner`.
    pub fn new(owner: &str) -> Self {
        let clock = Arc::new(ManualClock::new(start_time()));
        let sink: Arc<RecordingNotificationSink<GovernanceEvent>> =
            Arc::new(RecordingNotificationSink::new());
        let engine = GovernanceEngine::new(AccountId::from(owner), clock.clone(), sink.clone());
        Self {
            state: AppState::new(engine),
            clock,
            sink,
        }
    }

    /// A fresh router sharing this app's state.
    pub fn router(&self) -> Router {
        storymoot_api::app(self.state.clone())
    }

    /// Send a POST request as `caller` with a JSON body and return the response.
    pub async fn post_json(
        &self,
        caller: &str,
        uri: &str,
        body: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header(CALLER_HEADER, caller)
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();

        send(self.router(), request).await
    }

    /// Send a GET request and return the response.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        send(self.router(), request).await
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

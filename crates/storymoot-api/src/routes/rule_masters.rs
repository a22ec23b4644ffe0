//! Routes for rule-master role management.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use storymoot_core::account::AccountId;
use storymoot_governance::application::command_handlers;
use storymoot_governance::application::query_handlers::{self, RuleMasterView};
use storymoot_governance::domain::commands;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::caller::Caller;
use crate::error::ApiError;
use crate::routes::event_ids;
use crate::state::AppState;

/// Request body for `POST /`.
#[derive(Debug, Deserialize)]
pub struct AddRuleMasterRequest {
    /// The account to grant the role to.
    pub target: AccountId,
}

/// Response body for `POST /`.
#[derive(Debug, Serialize)]
pub struct AddRuleMasterResponse {
    /// Whether the role was newly granted.
    pub added: bool,
    /// IDs of the domain events produced and published.
    pub event_ids: Vec<Uuid>,
}

/// `POST /`
#[instrument(skip(state, caller, request), fields(target = %request.target))]
async fn add_rule_master(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<AddRuleMasterRequest>,
) -> Result<Json<AddRuleMasterResponse>, ApiError> {
    let command = commands::AddRuleMaster {
        correlation_id: Uuid::new_v4(),
        caller,
        target: request.target,
    };

    info!(correlation_id = %command.correlation_id, "handling add_rule_master command");

    let events = command_handlers::handle_add_rule_master(&command, &state.engine)?;

    Ok(Json(AddRuleMasterResponse {
        added: !events.is_empty(),
        event_ids: event_ids(&events),
    }))
}

/// `GET /{address}`
#[instrument(skip(state))]
async fn get_rule_master(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<RuleMasterView>, ApiError> {
    let view = query_handlers::get_rule_master_status(&AccountId::from(address), &state.engine)?;
    Ok(Json(view))
}

/// Returns the router for rule-master management.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_rule_master))
        .route("/{address}", get(get_rule_master))
}

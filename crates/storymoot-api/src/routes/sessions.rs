//! Routes for governance sessions and their membership.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use storymoot_core::account::AccountId;
use storymoot_governance::application::command_handlers;
use storymoot_governance::application::query_handlers::{self, MembershipView, SessionView};
use storymoot_governance::domain::commands;
use storymoot_governance::domain::sessions::Scope;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::caller::Caller;
use crate::error::ApiError;
use crate::routes::{CommandResponse, event_ids};
use crate::state::AppState;

/// Request body for `POST /`.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Caller-chosen session identifier.
    pub session_id: u64,
    /// What part of the story the session governs.
    pub scope: Scope,
}

/// Request body for `POST /{session_id}/members`.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// The account to add.
    pub user: AccountId,
}

/// Response body for `POST /`.
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    /// The created session.
    pub session_id: u64,
    /// IDs of the domain events produced and published.
    pub event_ids: Vec<Uuid>,
}

/// `POST /`
#[instrument(skip(state, caller, request), fields(session_id = request.session_id))]
async fn create_session(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let command = commands::CreateSession {
        correlation_id: Uuid::new_v4(),
        caller,
        session_id: request.session_id,
        scope: request.scope,
    };

    info!(correlation_id = %command.correlation_id, "handling create_session command");

    let events = command_handlers::handle_create_session(&command, &state.engine)?;

    Ok(Json(CreateSessionResponse {
        session_id: command.session_id,
        event_ids: event_ids(&events),
    }))
}

/// `POST /{session_id}/members`
#[instrument(skip(state, caller, request), fields(user = %request.user))]
async fn add_member(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(session_id): Path<u64>,
    Json(request): Json<AddMemberRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AddUserToSession {
        correlation_id: Uuid::new_v4(),
        caller,
        session_id,
        user: request.user,
    };

    info!(correlation_id = %command.correlation_id, "handling add_user_to_session command");

    let events = command_handlers::handle_add_user_to_session(&command, &state.engine)?;

    Ok(Json(CommandResponse {
        event_ids: event_ids(&events),
    }))
}

/// `GET /{session_id}`
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> Result<Json<SessionView>, ApiError> {
    let view = query_handlers::get_session_by_id(session_id, &state.engine)?;
    Ok(Json(view))
}

/// `GET /{session_id}/members/{address}`
#[instrument(skip(state))]
async fn get_membership(
    State(state): State<AppState>,
    Path((session_id, address)): Path<(u64, String)>,
) -> Result<Json<MembershipView>, ApiError> {
    let view =
        query_handlers::get_membership(session_id, &AccountId::from(address), &state.engine)?;
    Ok(Json(view))
}

/// Returns the router for sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/members", post(add_member))
        .route("/{session_id}/members/{address}", get(get_membership))
}

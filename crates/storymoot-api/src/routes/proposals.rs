//! Routes for proposals, voting, and resolution.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use storymoot_core::account::AccountId;
use storymoot_governance::application::command_handlers;
use storymoot_governance::application::query_handlers::{
    self, ProposalView, ResultsView, WinnerView,
};
use storymoot_governance::domain::commands;
use storymoot_governance::domain::events::{GovernanceEvent, GovernanceEventKind};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::caller::Caller;
use crate::error::ApiError;
use crate::routes::{CommandResponse, event_ids};
use crate::state::AppState;

/// Request body for `POST /`.
#[derive(Debug, Deserialize)]
pub struct CreateProposalRequest {
    /// The session the proposal belongs to.
    pub session_id: u64,
    /// Free-form description.
    pub description: String,
    /// Voting window length in seconds.
    pub duration_seconds: u64,
    /// Number of options, at least two.
    pub option_count: u8,
    /// Electorate snapshot.
    pub eligible_voters: Vec<AccountId>,
}

/// Request body for `POST /{proposal_id}/votes`.
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    /// Zero-based option index. Wider than the option range so that
    /// out-of-range ballots reach the domain and fail as `invalid_option`.
    pub option: u64,
}

/// Response body for `POST /`.
#[derive(Debug, Serialize)]
pub struct CreateProposalResponse {
    /// The assigned proposal id.
    pub proposal_id: u64,
    /// IDs of the domain events produced and published.
    pub event_ids: Vec<Uuid>,
}

/// Response body for `POST /{proposal_id}/votes`.
#[derive(Debug, Serialize)]
pub struct CastVoteResponse {
    /// Whether this ballot closed the proposal.
    pub closed: bool,
    /// IDs of the domain events produced and published.
    pub event_ids: Vec<Uuid>,
}

fn closes_proposal(events: &[GovernanceEvent]) -> bool {
    events
        .iter()
        .any(|e| matches!(e.kind, GovernanceEventKind::ProposalClosed(_)))
}

/// `POST /`
#[instrument(skip(state, caller, request), fields(session_id = request.session_id))]
async fn create_proposal(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<CreateProposalRequest>,
) -> Result<Json<CreateProposalResponse>, ApiError> {
    let command = commands::CreateProposal {
        correlation_id: Uuid::new_v4(),
        caller,
        session_id: request.session_id,
        description: request.description,
        duration_seconds: request.duration_seconds,
        option_count: request.option_count,
        eligible_voters: request.eligible_voters,
    };

    info!(correlation_id = %command.correlation_id, "handling create_proposal command");

    let created = command_handlers::handle_create_proposal(&command, &state.engine)?;

    Ok(Json(CreateProposalResponse {
        proposal_id: created.proposal_id,
        event_ids: event_ids(&created.events),
    }))
}

/// `POST /{proposal_id}/votes`
#[instrument(skip(state, caller, request), fields(option = request.option))]
async fn cast_vote(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(proposal_id): Path<u64>,
    Json(request): Json<CastVoteRequest>,
) -> Result<Json<CastVoteResponse>, ApiError> {
    let command = commands::CastVote {
        correlation_id: Uuid::new_v4(),
        caller,
        proposal_id,
        option: request.option,
    };

    info!(correlation_id = %command.correlation_id, "handling cast_vote command");

    let events = command_handlers::handle_cast_vote(&command, &state.engine)?;

    Ok(Json(CastVoteResponse {
        closed: closes_proposal(&events),
        event_ids: event_ids(&events),
    }))
}

/// `POST /{proposal_id}/close`
#[instrument(skip(state, caller))]
async fn close_proposal(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(proposal_id): Path<u64>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CloseProposal {
        correlation_id: Uuid::new_v4(),
        caller,
        proposal_id,
    };

    info!(correlation_id = %command.correlation_id, "handling close_proposal command");

    let events = command_handlers::handle_close_proposal(&command, &state.engine)?;

    Ok(Json(CommandResponse {
        event_ids: event_ids(&events),
    }))
}

/// `GET /{proposal_id}`
#[instrument(skip(state))]
async fn get_proposal(
    State(state): State<AppState>,
    Path(proposal_id): Path<u64>,
) -> Result<Json<ProposalView>, ApiError> {
    let view = query_handlers::get_proposal_by_id(proposal_id, &state.engine)?;
    Ok(Json(view))
}

/// `GET /{proposal_id}/results`
#[instrument(skip(state))]
async fn get_results(
    State(state): State<AppState>,
    Path(proposal_id): Path<u64>,
) -> Result<Json<ResultsView>, ApiError> {
    let view = query_handlers::get_results(proposal_id, &state.engine)?;
    Ok(Json(view))
}

/// `GET /{proposal_id}/winner`
#[instrument(skip(state))]
async fn get_winner(
    State(state): State<AppState>,
    Path(proposal_id): Path<u64>,
) -> Result<Json<WinnerView>, ApiError> {
    let view = query_handlers::get_winner(proposal_id, &state.engine)?;
    Ok(Json(view))
}

/// Returns the router for proposals.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_proposal))
        .route("/{proposal_id}", get(get_proposal))
        .route("/{proposal_id}/results", get(get_results))
        .route("/{proposal_id}/votes", post(cast_vote))
        .route("/{proposal_id}/close", post(close_proposal))
        .route("/{proposal_id}/winner", get(get_winner))
}

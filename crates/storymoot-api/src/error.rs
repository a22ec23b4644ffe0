//! Storymoot API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storymoot_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::Unauthorized { .. } => (StatusCode::FORBIDDEN, "unauthorized"),
            DomainError::NotEligible { .. } => (StatusCode::FORBIDDEN, "not_eligible"),
            DomainError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            DomainError::ProposalNotFound(_) => (StatusCode::NOT_FOUND, "proposal_not_found"),
            DomainError::DuplicateSession(_) => (StatusCode::CONFLICT, "duplicate_session"),
            DomainError::AlreadyVoted { .. } => (StatusCode::CONFLICT, "already_voted"),
            DomainError::ProposalClosed(_) => (StatusCode::CONFLICT, "proposal_closed"),
            DomainError::ProposalActive(_) => (StatusCode::CONFLICT, "proposal_active"),
            DomainError::InvalidOption { .. } => (StatusCode::BAD_REQUEST, "invalid_option"),
            DomainError::InvalidOptionCount(_) => (StatusCode::BAD_REQUEST, "invalid_option_count"),
            DomainError::EmptyElectorate => (StatusCode::BAD_REQUEST, "empty_electorate"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

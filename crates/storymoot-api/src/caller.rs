//! Caller identity extraction.
//!
//! The fronting auth collaborator authenticates the request and forwards the
//! caller's address in [`CALLER_HEADER`]. The API trusts the header as-is.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use storymoot_core::account::AccountId;

use crate::error::ErrorBody;

/// Header carrying the authenticated caller address.
pub const CALLER_HEADER: &str = "x-caller-address";

/// The authenticated account issuing a request.
#[derive(Debug, Clone)]
pub struct Caller(pub AccountId);

/// Rejection for requests without a usable caller header.
#[derive(Debug)]
pub struct MissingCaller;

impl IntoResponse for MissingCaller {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "missing_caller",
            message: format!("the {CALLER_HEADER} header is required"),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = MissingCaller;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(|address| Caller(AccountId::from(address)))
            .ok_or(MissingCaller)
    }
}

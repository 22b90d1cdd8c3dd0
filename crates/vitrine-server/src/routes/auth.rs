//! Bearer token authentication.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use vitrine_store::Principal;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller behind an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        principal_for(state, token).map(Authenticated)
    }
}

/// Resolve a raw token to a principal.
pub fn principal_for(state: &AppState, token: &str) -> Result<Principal, ApiError> {
    match state.identity().principal(token) {
        Some(principal) => Ok(principal),
        None => {
            tracing::debug!("Rejected unknown token");
            Err(ApiError::Unauthorized)
        }
    }
}

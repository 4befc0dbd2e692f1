//! Bearer token extraction for the REST path.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::AppState;

/// Authenticated user extracted from the `Authorization: Bearer <token>`
/// header. Delegates to the same [`TokenVerifier`](crate::auth::verifier::TokenVerifier)
/// instance the gateway uses, and rejects through [`ApiError`] so auth
/// failures wear the same error envelope as every other REST failure.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        let principal = state
            .verifier
            .verify(token)
            .map_err(|failure| ApiError::unauthorized(failure.reason))?;

        Ok(AuthUser {
            user_id: principal.user_id,
        })
    }
}

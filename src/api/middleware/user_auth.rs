//! Request extractor that authenticates the caller via a Bearer JWT

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::{User, UserId};

/// Extractor that resolves the authenticated user from the Authorization header.
///
/// Rejects the request with a 401 when the header is missing, the token is
/// invalid or expired, or the user no longer exists or has been suspended.
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(parts)
            .ok_or_else(|| ApiError::unauthorized("Missing or malformed Authorization header"))?;

        let claims = state
            .jwt_service
            .validate(&token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        let user_id = UserId::new(claims.user_id())
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        let user = state
            .user_service
            .get(&user_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;

        if !user.is_active() {
            return Err(ApiError::unauthorized("User account is not active"));
        }

        Ok(RequireUser(user))
    }
}

/// Pull the bearer token out of the Authorization header, if present
fn extract_jwt_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(axum::http::header::AUTHORIZATION)?;
    let value = header.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

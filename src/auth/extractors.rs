use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};

use super::repo_types::User;
use super::services::{self, JwtKeys};
use crate::state::AppState;

/// Extracts the bearer token and resolves it to an active, verified user.
/// Every failure mode answers with the same 401 so callers cannot probe
/// account existence or state.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || (StatusCode::UNAUTHORIZED, "Invalid token".to_string());

        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(unauthorized)?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(unauthorized)?;

        let keys = JwtKeys::from_ref(state);
        let user = services::resolve_user(&state.db, &keys, token)
            .await
            .ok_or_else(unauthorized)?;

        Ok(CurrentUser(user))
    }
}

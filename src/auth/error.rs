use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Outcomes the auth flows surface to callers. Every token or account-state
/// failure is flattened into `InvalidToken` so callers cannot tell them
/// apart; store failures stay opaque behind `Internal`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Password too short")]
    PasswordTooShort,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email not verified")]
    EmailNotVerified,
    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,
    #[error("User not found or already verified")]
    NotFoundOrAlreadyVerified,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid token")]
    InvalidToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::InvalidEmail
            | AuthError::PasswordTooShort
            | AuthError::InvalidOrExpiredCode => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::EmailNotVerified => StatusCode::FORBIDDEN,
            AuthError::NotFoundOrAlreadyVerified | AuthError::UserNotFound => {
                StatusCode::NOT_FOUND
            }
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(e) = &self {
            error!(error = %e, "internal error");
        }
        (self.status(), self.to_string()).into_response()
    }
}

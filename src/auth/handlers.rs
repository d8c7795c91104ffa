use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            ConfirmForgotPasswordRequest, ConfirmSignupRequest, ForgotPasswordRequest,
            MessageResponse, ProfileResponse, RefreshRequest, ResendConfirmationRequest,
            SigninRequest, SignupRequest, TokenPair, UserProfile,
        },
        error::AuthError,
        extractors::CurrentUser,
        repo_types::User,
        services::{generate_code, hash_password, is_valid_email, verify_password, JwtKeys},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/confirm-signup", post(confirm_signup))
        .route("/auth/resend-confirmation-code", post(resend_confirmation))
        .route("/auth/signin", post(signin))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/confirm-forgot-password", post(confirm_forgot_password))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

fn issue_token_pair(keys: &JwtKeys, email: &str) -> Result<TokenPair, AuthError> {
    let (access_token, _) = keys.sign_access(email)?;
    let refresh_token = keys.sign_refresh(email)?;
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    payload.email = payload.email.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::InvalidEmail);
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AuthError::PasswordTooShort);
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AuthError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password)?;
    let code = generate_code();
    let expires = OffsetDateTime::now_utc() + TimeDuration::minutes(state.config.code_ttl_minutes);

    let user = User::create(
        &state.db,
        &payload.email,
        &payload.first_name,
        &payload.last_name,
        &hash,
        &code,
        expires,
    )
    .await?;

    state.mailer.deliver(&user.email, &code).await?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok(Json(MessageResponse::new(
        "User created, check email for confirmation code",
    )))
}

#[instrument(skip(state, payload))]
pub async fn confirm_signup(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmSignupRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let email = payload.email.trim();
    let now = OffsetDateTime::now_utc();

    let user = User::confirm_email(&state.db, email, &payload.confirmation_code, now)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "confirmation rejected");
            AuthError::InvalidOrExpiredCode
        })?;

    let keys = JwtKeys::from_ref(&state);
    let pair = issue_token_pair(&keys, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "email confirmed");
    Ok(Json(pair))
}

#[instrument(skip(state, payload))]
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Json(payload): Json<ResendConfirmationRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let email = payload.email.trim();
    let code = generate_code();
    let expires = OffsetDateTime::now_utc() + TimeDuration::minutes(state.config.code_ttl_minutes);

    if !User::set_confirmation_code(&state.db, email, &code, expires).await? {
        warn!(email = %email, "resend for unknown or already verified user");
        return Err(AuthError::NotFoundOrAlreadyVerified);
    }

    state.mailer.deliver(email, &code).await?;

    info!(email = %email, "confirmation code resent");
    Ok(Json(MessageResponse::new("Code resent")))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Json(mut payload): Json<SigninRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    payload.email = payload.email.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::InvalidEmail);
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "signin unknown email");
            AuthError::InvalidCredentials
        })?;

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(email = %payload.email, user_id = %user.id, "signin invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    if !user.is_verified {
        warn!(email = %payload.email, user_id = %user.id, "signin before email confirmation");
        return Err(AuthError::EmailNotVerified);
    }

    let keys = JwtKeys::from_ref(&state);
    let pair = issue_token_pair(&keys, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user signed in");
    Ok(Json(pair))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let email = payload.email.trim();
    let code = generate_code();
    let expires = OffsetDateTime::now_utc() + TimeDuration::minutes(state.config.code_ttl_minutes);

    if !User::set_reset_code(&state.db, email, &code, expires).await? {
        warn!(email = %email, "password reset for unknown email");
        return Err(AuthError::UserNotFound);
    }

    state.mailer.deliver(email, &code).await?;

    info!(email = %email, "reset code sent");
    Ok(Json(MessageResponse::new("Reset code sent to email")))
}

#[instrument(skip(state, payload))]
pub async fn confirm_forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let email = payload.email.trim();

    if payload.new_password.len() < 8 {
        warn!("new password too short");
        return Err(AuthError::PasswordTooShort);
    }

    let hash = hash_password(&payload.new_password)?;
    let now = OffsetDateTime::now_utc();

    if !User::reset_password(&state.db, email, &payload.confirmation_code, now, &hash).await? {
        warn!(email = %email, "password reset rejected");
        return Err(AuthError::InvalidOrExpiredCode);
    }

    info!(email = %email, "password reset");
    Ok(Json(MessageResponse::new("Password reset successful")))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        debug!(error = %e, "refresh token rejected");
        AuthError::InvalidToken
    })?;

    if state.config.jwt.refresh_checks_account_status {
        match User::find_by_email(&state.db, &claims.sub).await? {
            Some(user) if user.is_active && user.is_verified => {}
            _ => {
                warn!(email = %claims.sub, "refresh rejected by account status");
                return Err(AuthError::InvalidToken);
            }
        }
    }

    let pair = issue_token_pair(&keys, &claims.sub)?;
    info!(email = %claims.sub, "token pair refreshed");
    Ok(Json(pair))
}

/// Tokens are stateless, so there is nothing to invalidate server-side;
/// this only acknowledges the client-side discard.
#[instrument]
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out"))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, AuthError> {
    let keys = JwtKeys::from_ref(&state);
    let now = OffsetDateTime::now_utc().unix_timestamp();

    Ok(Json(ProfileResponse {
        user: UserProfile {
            sub: user.id,
            name: format!("{} {}", user.first_name, user.last_name),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            email_verified: user.is_verified,
            user_status: if user.is_active { "active" } else { "inactive" }.to_string(),
            enabled: user.is_active,
            token_use: "auth".to_string(),
            scope: "user".to_string(),
            auth_time: now,
            issued_at: now,
            expires_at: now + keys.access_ttl.as_secs() as i64,
        },
    }))
}

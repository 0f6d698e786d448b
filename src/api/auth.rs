//! Sign-in and session endpoints.

use axum::{extract::State, http::HeaderMap, Json};

use super::{success, ApiResult};
use crate::auth::bearer_token;
use crate::errors::AppError;
use crate::models::{Session, SignInRequest};
use crate::AppState;

/// POST /api/auth/sign-in - Exchange credentials for a bearer token.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Session> {
    if request.email.trim().is_empty() {
        return Err(AppError::validation("email", "Email is required"));
    }
    if request.password.is_empty() {
        return Err(AppError::validation("password", "Password is required"));
    }
    success(
        state
            .sessions
            .sign_in(request.email.trim(), &request.password)
            .await?,
    )
}

/// GET /api/auth/session - The session behind the bearer token.
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Session> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
    match state.sessions.session(&token).await {
        Some(session) => success(session),
        None => Err(AppError::Unauthorized("Session expired or unknown".to_string())),
    }
}

/// POST /api/auth/sign-out - End the session behind the bearer token.
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<bool> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
    success(state.sessions.sign_out(&token).await)
}

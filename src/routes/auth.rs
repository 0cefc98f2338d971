use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::routes::validation::extract_bearer_token;
use crate::security::verify_password;
use crate::token::{issue_default_access_token, issue_refresh_token, redeem_refresh_token};
use crate::{token, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: u64,
    pub email: String,
    pub is_chirpy_red: bool,
    /// Short-lived signed access token
    pub token: String,
    /// Long-lived opaque refresh token
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Log in with email and password
///
/// On success returns the user plus one access token and one refresh token.
///
/// # Security
/// Every failure — unknown email, wrong password — collapses into the same
/// generic 401 so responses cannot be used to enumerate accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let db = state.db.clone();
    let user = tokio::task::spawn_blocking(move || {
        let user = db
            .get_user_by_email(&payload.email)
            .map_err(|_| AppError::Unauthorized)?;

        // Expensive verification stays off the async runtime
        if !verify_password(&payload.password, &user.password_hash) {
            tracing::info!("Failed login attempt for user {}", user.id);
            return Err(AppError::Unauthorized);
        }
        Ok(user)
    })
    .await??;

    let token = issue_default_access_token(user.id, &state.config.jwt_secret)?;
    let db = state.db.clone();
    let user_id = user.id;
    let refresh_token =
        tokio::task::spawn_blocking(move || issue_refresh_token(&db, user_id)).await??;

    tracing::info!("User {} logged in", user.id);
    Ok(Json(LoginResponse {
        id: user.id,
        email: user.email,
        is_chirpy_red: user.is_chirpy_red,
        token,
        refresh_token,
    }))
}

/// Mint a new access token from a refresh token
///
/// The refresh token itself is not rotated: it stays valid until its own
/// expiry or an explicit revoke.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>> {
    let refresh_token = extract_bearer_token(&headers)?.to_string();

    let db = state.db.clone();
    let user_id =
        tokio::task::spawn_blocking(move || redeem_refresh_token(&db, &refresh_token)).await??;

    let token = issue_default_access_token(user_id, &state.config.jwt_secret)?;
    Ok(Json(RefreshResponse { token }))
}

/// Revoke a refresh token
///
/// Always succeeds: revoking an unknown or already-revoked token is a no-op,
/// so the response never reveals which tokens exist.
pub async fn revoke(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    let refresh_token = extract_bearer_token(&headers)?.to_string();

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || token::revoke_refresh_token(&db, &refresh_token))
        .await??;

    Ok(StatusCode::NO_CONTENT)
}

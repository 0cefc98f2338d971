use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::Deserialize;

use crate::constants::ERR_INVALID_EMAIL;
use crate::error::{AppError, Result};
use crate::models::{User, UserResponse};
use crate::routes::validation::authenticate;
use crate::security::hash_password;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register a new user
///
/// Hashes the password (never stored in plaintext) and creates the record.
/// Returns 400 if the email is malformed or already registered.
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    if !User::validate_email(&payload.email) {
        return Err(AppError::ValidationFailed(ERR_INVALID_EMAIL.to_string()));
    }

    let db = state.db.clone();
    let user = tokio::task::spawn_blocking(move || {
        // Hashing is deliberately expensive; keep it off the async runtime
        let password_hash = hash_password(&payload.password)?;
        db.create_user(&payload.email, &password_hash)
    })
    .await??;

    tracing::info!("New user registered: id={}", user.id);
    Ok((StatusCode::CREATED, Json(user.to_response())))
}

/// Update the authenticated user's own email and/or password
///
/// The target account is always the access token's subject — there is no way
/// to address another user's account from this endpoint. Changing the
/// password revokes every refresh token the user holds, so stolen refresh
/// tokens die with the old password.
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    let user_id = authenticate(&headers, &state.config)?;

    if let Some(email) = &payload.email {
        if !User::validate_email(email) {
            return Err(AppError::ValidationFailed(ERR_INVALID_EMAIL.to_string()));
        }
    }

    let db = state.db.clone();
    let user = tokio::task::spawn_blocking(move || {
        let password_changed = payload.password.is_some();
        let new_hash = match payload.password {
            Some(password) => Some(hash_password(&password)?),
            None => None,
        };

        let user = db.update_user(user_id, payload.email.as_deref(), new_hash.as_deref(), None)?;

        if password_changed {
            db.revoke_refresh_tokens_for_user(user_id)?;
            tracing::info!("Password changed for user {}; refresh tokens revoked", user_id);
        }

        Ok::<_, AppError>(user)
    })
    .await??;

    Ok(Json(user.to_response()))
}

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::Deserialize;

use crate::constants::EVENT_USER_UPGRADED;
use crate::error::{AppError, Result};
use crate::routes::validation::extract_api_key;
use crate::security::verify_shared_secret;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub user_id: u64,
}

/// Billing webhook: upgrade a user's account
///
/// The caller authenticates with a static shared key, not a user token.
/// Only the `user.upgraded` event is acted on; any other event kind is
/// accepted and ignored so the sender can add kinds without breaking us.
///
/// # Security
/// The presented key is compared against the configured one in constant
/// time (see `security::verify_shared_secret`).
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookRequest>,
) -> Result<StatusCode> {
    let api_key = extract_api_key(&headers)?;
    if !verify_shared_secret(api_key, &state.config.polka_key) {
        tracing::warn!("Webhook call with invalid API key");
        return Err(AppError::Unauthorized);
    }

    if payload.event != EVENT_USER_UPGRADED {
        tracing::debug!("Ignoring webhook event: {}", payload.event);
        return Ok(StatusCode::NO_CONTENT);
    }

    let db = state.db.clone();
    let user_id = payload.data.user_id;
    tokio::task::spawn_blocking(move || db.update_user(user_id, None, None, Some(true)))
        .await??;

    tracing::info!("User {} upgraded via webhook", user_id);
    Ok(StatusCode::NO_CONTENT)
}

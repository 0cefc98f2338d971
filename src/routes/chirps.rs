use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Chirp, SortOrder};
use crate::routes::validation::authenticate;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ListChirpsQuery {
    /// "asc" (default) or "desc"
    pub sort: Option<String>,
}

/// Post a chirp as the authenticated user
///
/// The body is trimmed, length-checked and profanity-masked by the store;
/// over-long or empty bodies come back as 400.
pub async fn create_chirp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateChirpRequest>,
) -> Result<(StatusCode, Json<Chirp>)> {
    let author_id = authenticate(&headers, &state.config)?;

    let db = state.db.clone();
    let chirp =
        tokio::task::spawn_blocking(move || db.create_chirp(&payload.body, author_id)).await??;

    tracing::info!("Chirp {} posted by user {}", chirp.id, author_id);
    Ok((StatusCode::CREATED, Json(chirp)))
}

/// List all chirps, oldest first unless `?sort=desc`
///
/// No authentication: chirps are public reads.
pub async fn list_chirps(
    State(state): State<AppState>,
    Query(params): Query<ListChirpsQuery>,
) -> Json<Vec<Chirp>> {
    let order = SortOrder::from_query(params.sort.as_deref());
    Json(state.db.list_chirps(order))
}

/// Fetch a single chirp by id
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<u64>,
) -> Result<Json<Chirp>> {
    Ok(Json(state.db.get_chirp_by_id(chirp_id)?))
}

/// Delete a chirp; only its author may do so
///
/// 403 when the authenticated user is not the author, 404 when the chirp
/// does not exist.
pub async fn delete_chirp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chirp_id): Path<u64>,
) -> Result<StatusCode> {
    let requester_id = authenticate(&headers, &state.config)?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || db.delete_chirp(chirp_id, requester_id)).await??;

    Ok(StatusCode::NO_CONTENT)
}

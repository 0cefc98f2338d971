use std::sync::atomic::Ordering;

use axum::{extract::State, http::StatusCode, response::Html};

use crate::AppState;

/// Admin metrics page
///
/// GET /admin/metrics — HTML page showing how many times the static site
/// has been served.
pub async fn admin_metrics(State(state): State<AppState>) -> Html<String> {
    let hits = state.fileserver_hits.load(Ordering::Relaxed);
    Html(format!(
        "<html><body><h1>Welcome, Chirpy Admin</h1>\
         <p>Chirpy has been visited {} times!</p></body></html>",
        hits
    ))
}

/// Plain-text hit counter
///
/// GET /api/metrics
pub async fn api_metrics(State(state): State<AppState>) -> String {
    format!("Hits: {}", state.fileserver_hits.load(Ordering::Relaxed))
}

/// Reset the hit counter
///
/// POST /api/reset
pub async fn reset_metrics(State(state): State<AppState>) -> StatusCode {
    state.fileserver_hits.store(0, Ordering::Relaxed);
    StatusCode::OK
}

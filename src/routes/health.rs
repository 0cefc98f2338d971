use axum::http::StatusCode;

/// Readiness endpoint
///
/// Used by load balancers and monitoring systems.
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

use axum::http::{header, HeaderMap};

use crate::error::{AppError, Result};
use crate::token::verify_access_token;
use crate::Config;

/// Pull the token out of an `Authorization: Bearer <token>` header
///
/// A missing or malformed header is a plain `Unauthorized`; the caller never
/// learns whether a header was absent or just misspelled.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)
}

/// Pull the key out of an `Authorization: ApiKey <key>` header
///
/// Used by the billing webhook, which authenticates with a static shared
/// secret rather than a user token.
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    value
        .strip_prefix("ApiKey ")
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(AppError::Unauthorized)
}

/// Resolve the authenticated user id from the request headers
pub fn authenticate(headers: &HeaderMap, config: &Config) -> Result<u64> {
    let token = extract_bearer_token(headers)?;
    verify_access_token(token, &config.jwt_secret)
}

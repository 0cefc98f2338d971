use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::constants::{
    ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_BYTES, REFRESH_TOKEN_TTL_DAYS, TOKEN_ISSUER,
};
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::RefreshTokenRecord;

/// Claims carried by an access token
///
/// `sub` is the user id as a decimal string. Verification is stateless — no
/// store lookup — which is why access tokens are short-lived: expiry is the
/// only revocation they get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

// =============================================================================
// Access Tokens (signed, self-contained)
// =============================================================================

/// Issue a signed access token for a user
pub fn issue_access_token(user_id: u64, secret: &str, ttl_secs: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        iss: TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("Failed to sign access token: {}", e);
        AppError::TokenInvalid
    })
}

/// Issue an access token with the default TTL
pub fn issue_default_access_token(user_id: u64, secret: &str) -> Result<String> {
    issue_access_token(user_id, secret, ACCESS_TOKEN_TTL_SECS)
}

/// Verify an access token and return the user id it names
///
/// An expired signature maps to `TokenExpired`; a bad signature, wrong
/// issuer, or malformed payload maps to `TokenInvalid`.
pub fn verify_access_token(token: &str, secret: &str) -> Result<u64> {
    let mut validation = Validation::default();
    validation.set_issuer(&[TOKEN_ISSUER]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::TokenInvalid,
    })?;

    data.claims
        .sub
        .parse::<u64>()
        .map_err(|_| AppError::TokenInvalid)
}

// =============================================================================
// Refresh Tokens (opaque, store-backed)
// =============================================================================

/// Issue a refresh token and persist its record
///
/// The token is 32 bytes from the OS RNG, hex-encoded. Long-lived by design;
/// revocation goes through the store, not through expiry.
pub fn issue_refresh_token(db: &Db, user_id: u64) -> Result<String> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let token = hex::encode(bytes);

    let record = RefreshTokenRecord {
        token: token.clone(),
        user_id,
        expires_at: (Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS)).timestamp(),
        revoked: false,
    };
    db.put_refresh_token(record)?;

    Ok(token)
}

/// Redeem a refresh token, returning the owning user id
///
/// Checked in order: existence (`TokenInvalid`), revocation (`TokenRevoked`),
/// expiry (`TokenExpired`). The token is NOT rotated on success — it stays
/// valid until its own expiry or an explicit revoke.
pub fn redeem_refresh_token(db: &Db, token: &str) -> Result<u64> {
    let record = match db.get_refresh_token(token) {
        Ok(record) => record,
        Err(AppError::NotFound) => return Err(AppError::TokenInvalid),
        Err(e) => return Err(e),
    };

    if record.revoked {
        return Err(AppError::TokenRevoked);
    }
    if record.is_expired(Utc::now().timestamp()) {
        return Err(AppError::TokenExpired);
    }

    Ok(record.user_id)
}

/// Revoke a refresh token, idempotently
///
/// Revoking an unknown token succeeds as a no-op so the endpoint never
/// reveals which tokens exist. Revoking an already-revoked token is equally
/// fine: the tombstone stays a tombstone.
pub fn revoke_refresh_token(db: &Db, token: &str) -> Result<()> {
    match db.revoke_refresh_token(token) {
        Ok(()) | Err(AppError::NotFound) => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_database;
    use tempfile::TempDir;

    const SECRET: &str = "test-signing-secret";

    fn test_db(dir: &TempDir) -> Db {
        open_database(dir.path().join("test.json")).unwrap()
    }

    // =========================================================================
    // Access Token Tests
    // =========================================================================

    #[test]
    fn test_issue_and_verify() {
        let token = issue_access_token(7, SECRET, 3600).unwrap();
        assert_eq!(verify_access_token(&token, SECRET).unwrap(), 7);
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let token = issue_access_token(7, SECRET, 3600).unwrap();
        let err = verify_access_token(&token, "some-other-secret");
        assert!(matches!(err, Err(AppError::TokenInvalid)));
    }

    #[test]
    fn test_verify_expired_token() {
        // Issued already expired; leeway is 60s by default, so go past it
        let token = issue_access_token(7, SECRET, -120).unwrap();
        let err = verify_access_token(&token, SECRET);
        assert!(matches!(err, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_verify_garbage_token() {
        let err = verify_access_token("not.a.jwt", SECRET);
        assert!(matches!(err, Err(AppError::TokenInvalid)));

        let err = verify_access_token("", SECRET);
        assert!(matches!(err, Err(AppError::TokenInvalid)));
    }

    // =========================================================================
    // Refresh Token Tests
    // =========================================================================

    #[test]
    fn test_refresh_token_shape() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);

        let token = issue_refresh_token(&db, 1).unwrap();
        // 32 bytes hex-encoded
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        // Two tokens never collide
        let other = issue_refresh_token(&db, 1).unwrap();
        assert_ne!(token, other);
    }

    #[test]
    fn test_redeem_is_not_rotation() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);

        let token = issue_refresh_token(&db, 42).unwrap();
        assert_eq!(redeem_refresh_token(&db, &token).unwrap(), 42);
        // Same token redeems again; no rotation
        assert_eq!(redeem_refresh_token(&db, &token).unwrap(), 42);
    }

    #[test]
    fn test_redeem_unknown_token() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);

        let err = redeem_refresh_token(&db, &"00".repeat(32));
        assert!(matches!(err, Err(AppError::TokenInvalid)));
    }

    #[test]
    fn test_redeem_revoked_token() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);

        let token = issue_refresh_token(&db, 1).unwrap();
        revoke_refresh_token(&db, &token).unwrap();

        let err = redeem_refresh_token(&db, &token);
        assert!(matches!(err, Err(AppError::TokenRevoked)));
    }

    #[test]
    fn test_redeem_expired_token() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);

        db.put_refresh_token(RefreshTokenRecord {
            token: "ee".repeat(32),
            user_id: 1,
            expires_at: Utc::now().timestamp() - 1,
            revoked: false,
        })
        .unwrap();

        let err = redeem_refresh_token(&db, &"ee".repeat(32));
        assert!(matches!(err, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);

        let token = issue_refresh_token(&db, 1).unwrap();
        revoke_refresh_token(&db, &token).unwrap();
        // Second revoke and unknown-token revoke both succeed
        revoke_refresh_token(&db, &token).unwrap();
        revoke_refresh_token(&db, &"ff".repeat(32)).unwrap();
    }
}

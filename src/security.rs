use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password with Argon2id
///
/// The output is a PHC string carrying the salt and cost parameters, so the
/// same password hashes to a different string on every call but always
/// verifies against any of them.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            AppError::Hashing
        })?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2id PHC string
///
/// Never fails loudly: a wrong password and a malformed stored hash both
/// come back as `false`. Callers map that to a generic Unauthorized so the
/// response cannot reveal which part of the check failed.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed = match PasswordHash::new(password_hash) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Shared-Secret Comparison (Webhook Authentication)
// =============================================================================

/// Fixed domain-separation key for shared-secret comparison
const COMPARE_KEY: &[u8] = b"chirpy-shared-secret-compare-v1";

/// Compare a presented secret against the configured one in constant time
///
/// Both values are run through HMAC-SHA256 under a fixed key and the tags are
/// compared with `Mac::verify_slice`, which is constant-time. A plain `==`
/// on the raw strings would short-circuit at the first differing byte and
/// leak prefix length through timing.
pub fn verify_shared_secret(presented: &str, expected: &str) -> bool {
    let tag = match HmacSha256::new_from_slice(COMPARE_KEY) {
        Ok(mut mac) => {
            mac.update(presented.as_bytes());
            mac.finalize().into_bytes()
        }
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    match HmacSha256::new_from_slice(COMPARE_KEY) {
        Ok(mut mac) => {
            mac.update(expected.as_bytes());
            mac.verify_slice(&tag).is_ok()
        }
        Err(_) => false,
    }
}

use serde::{Deserialize, Serialize};

/// Refresh token record stored in the database file
///
/// Records are tombstoned rather than deleted: once revoked they stay in the
/// store forever, so replay of a revoked token is always detectable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Opaque random hex string, primary key
    pub token: String,
    pub user_id: u64,
    /// Absolute expiry (Unix timestamp, seconds)
    pub expires_at: i64,
    #[serde(default)]
    pub revoked: bool,
}

impl RefreshTokenRecord {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

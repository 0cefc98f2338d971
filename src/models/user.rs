use serde::{Deserialize, Serialize};

/// User record as stored in the database file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    /// Unique across all users, compared case-sensitively as stored
    pub email: String,
    /// Argon2id PHC string; the plaintext password is never stored
    pub password_hash: String,
    /// Elevated account status, set via the billing webhook
    #[serde(default)]
    pub is_chirpy_red: bool,
}

impl User {
    /// Minimal email sanity check applied at registration
    pub fn validate_email(email: &str) -> bool {
        !email.is_empty() && email.contains('@')
    }

    /// Strip the password hash for API responses
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            email: self.email.clone(),
            is_chirpy_red: self.is_chirpy_red,
        }
    }
}

/// User model for API responses (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: u64,
    pub email: String,
    pub is_chirpy_red: bool,
}

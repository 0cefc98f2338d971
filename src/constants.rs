/// Maximum chirp body length in characters
/// Anything longer is rejected outright rather than truncated,
/// so clients get deterministic behavior.
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Words that are masked out of chirp bodies before storage
pub const PROFANE_WORDS: &[&str] = &["kerfuffle", "sharbert", "fornax"];

/// Replacement for masked words
pub const PROFANITY_MASK: &str = "****";

/// Access token lifetime in seconds (1 hour)
/// Short on purpose: verification is stateless, so expiry is the only
/// revocation mechanism access tokens have.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// Refresh token lifetime in days
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// Entropy of a refresh token in bytes (hex-encoded to 64 characters)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Issuer claim embedded in every access token
pub const TOKEN_ISSUER: &str = "chirpy";

/// Webhook event kind that upgrades an account
pub const EVENT_USER_UPGRADED: &str = "user.upgraded";

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for an empty chirp body
pub const ERR_EMPTY_CHIRP: &str = "Chirp body must not be empty";

/// Error message for an over-long chirp body
pub const ERR_CHIRP_TOO_LONG: &str = "Chirp is too long";

/// Error message for a malformed registration email
pub const ERR_INVALID_EMAIL: &str = "Invalid email address";

use serde::{Deserialize, Serialize};

use crate::constants::{
    ERR_CHIRP_TOO_LONG, ERR_EMPTY_CHIRP, MAX_CHIRP_LENGTH, PROFANE_WORDS, PROFANITY_MASK,
};
use crate::error::{AppError, Result};

/// A short user-authored text record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chirp {
    pub id: u64,
    /// Length-bounded, profanity-masked before storage
    pub body: String,
    pub author_id: u64,
}

impl Chirp {
    /// Apply the body policy: trim, reject empty or over-long, mask profanity
    ///
    /// Over-long bodies are rejected rather than truncated. Masking replaces
    /// whole words only, case-insensitively; punctuation attached to a word
    /// leaves it unmasked (e.g. "sharbert!" passes through).
    pub fn clean_body(body: &str) -> Result<String> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(AppError::ValidationFailed(ERR_EMPTY_CHIRP.to_string()));
        }
        if trimmed.chars().count() > MAX_CHIRP_LENGTH {
            return Err(AppError::ValidationFailed(ERR_CHIRP_TOO_LONG.to_string()));
        }

        let cleaned: Vec<&str> = trimmed
            .split(' ')
            .map(|word| {
                if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                    PROFANITY_MASK
                } else {
                    word
                }
            })
            .collect();

        Ok(cleaned.join(" "))
    }
}

/// Sort order for chirp listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Parse the `sort` query parameter; anything other than "desc" sorts ascending
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }
}

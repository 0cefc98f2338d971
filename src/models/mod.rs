pub mod chirp;
pub mod refresh_token;
pub mod snapshot;
pub mod user;

pub use chirp::{Chirp, SortOrder};
pub use refresh_token::RefreshTokenRecord;
pub use snapshot::Snapshot;
pub use user::{User, UserResponse};

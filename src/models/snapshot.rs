use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{Chirp, RefreshTokenRecord, User};

/// Current on-disk format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// The complete durable state of the service
///
/// The whole snapshot is rewritten to disk on every mutation, so what is in
/// memory and what is on disk are never allowed to diverge.
///
/// Invariant: `next_user_id` and `next_chirp_id` are strictly greater than the
/// maximum id present in their collections, and never decrease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub next_user_id: u64,
    pub next_chirp_id: u64,
    /// Keyed by user id; BTreeMap keeps the file diff-friendly
    pub users: BTreeMap<u64, User>,
    /// Keyed by chirp id
    pub chirps: BTreeMap<u64, Chirp>,
    /// Keyed by the opaque token string
    pub refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            version: SNAPSHOT_VERSION,
            next_user_id: 1,
            next_chirp_id: 1,
            users: BTreeMap::new(),
            chirps: BTreeMap::new(),
            refresh_tokens: HashMap::new(),
        }
    }
}

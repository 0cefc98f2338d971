use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{AppError, Result};
use crate::models::{Chirp, RefreshTokenRecord, Snapshot, SortOrder, User};

/// Database handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<Store>;

/// Single-file snapshot store
///
/// All durable state lives in one JSON file mirrored by an in-memory
/// `Snapshot` behind a single `RwLock`. Every mutation rewrites the whole
/// file under the write lock, so two writers never interleave and a reader
/// never observes a half-applied change. Deliberately simple: the working
/// set is small enough that write throughput is not a concern.
pub struct Store {
    path: PathBuf,
    inner: RwLock<Snapshot>,
}

/// Open or create the database file at the given path
///
/// A missing file initializes an empty snapshot with counters at 1. A file
/// that exists but does not parse is fatal at startup — a corrupt database
/// is not something to limp past per-request.
pub fn open_database(path: impl AsRef<Path>) -> Result<Db> {
    tracing::info!("Opening database at: {:?}", path.as_ref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                AppError::Storage(e)
            })?;
        }
    }

    let snapshot = match fs::read_to_string(path.as_ref()) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
            tracing::error!("Database file exists but cannot be parsed: {}", e);
            AppError::StorageCorrupt(e.to_string())
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No database file found, starting empty");
            Snapshot::default()
        }
        Err(e) => return Err(AppError::Storage(e)),
    };

    tracing::info!(
        "Database loaded: {} users, {} chirps, {} refresh tokens",
        snapshot.users.len(),
        snapshot.chirps.len(),
        snapshot.refresh_tokens.len()
    );

    Ok(Arc::new(Store {
        path: path.as_ref().to_path_buf(),
        inner: RwLock::new(snapshot),
    }))
}

impl Store {
    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serialize the snapshot and rewrite the database file atomically
    ///
    /// Write-to-temp-then-rename: a crash mid-write leaves the previous file
    /// intact, never a truncated one. Called with the write lock held so the
    /// file always reflects a consistent snapshot.
    fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Create a user, enforcing email uniqueness (case-sensitive)
    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let mut snapshot = self.write();

        if snapshot.users.values().any(|u| u.email == email) {
            tracing::info!("Registration rejected: email already in use");
            return Err(AppError::DuplicateEmail);
        }

        let user = User {
            id: snapshot.next_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_chirpy_red: false,
        };
        snapshot.next_user_id += 1;
        snapshot.users.insert(user.id, user.clone());

        self.persist(&snapshot)?;
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    pub fn get_user_by_id(&self, id: u64) -> Result<User> {
        self.read().users.get(&id).cloned().ok_or(AppError::NotFound)
    }

    /// Partial update of a user record
    ///
    /// A new email must not collide with a different user; colliding with the
    /// user's own current email is fine.
    pub fn update_user(
        &self,
        id: u64,
        new_email: Option<&str>,
        new_password_hash: Option<&str>,
        is_chirpy_red: Option<bool>,
    ) -> Result<User> {
        let mut snapshot = self.write();

        if !snapshot.users.contains_key(&id) {
            return Err(AppError::NotFound);
        }

        if let Some(email) = new_email {
            if snapshot
                .users
                .values()
                .any(|u| u.email == email && u.id != id)
            {
                return Err(AppError::DuplicateEmail);
            }
        }

        let user = snapshot.users.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(email) = new_email {
            user.email = email.to_string();
        }
        if let Some(hash) = new_password_hash {
            user.password_hash = hash.to_string();
        }
        if let Some(flag) = is_chirpy_red {
            user.is_chirpy_red = flag;
        }
        let updated = user.clone();

        self.persist(&snapshot)?;
        Ok(updated)
    }

    // =========================================================================
    // Chirps
    // =========================================================================

    /// Create a chirp for an existing user
    ///
    /// The body must already have passed `Chirp::clean_body`; this method
    /// re-applies the policy so the store never accepts an invalid body no
    /// matter which path reaches it.
    pub fn create_chirp(&self, body: &str, author_id: u64) -> Result<Chirp> {
        let body = Chirp::clean_body(body)?;

        let mut snapshot = self.write();

        if !snapshot.users.contains_key(&author_id) {
            return Err(AppError::NotFound);
        }

        let chirp = Chirp {
            id: snapshot.next_chirp_id,
            body,
            author_id,
        };
        snapshot.next_chirp_id += 1;
        snapshot.chirps.insert(chirp.id, chirp.clone());

        self.persist(&snapshot)?;
        Ok(chirp)
    }

    /// All chirps sorted by id
    ///
    /// Returns an owned snapshot of the collection, not a live view.
    pub fn list_chirps(&self, order: SortOrder) -> Vec<Chirp> {
        let snapshot = self.read();
        let mut chirps: Vec<Chirp> = snapshot.chirps.values().cloned().collect();
        // BTreeMap iteration is already ascending by id
        if order == SortOrder::Descending {
            chirps.reverse();
        }
        chirps
    }

    pub fn get_chirp_by_id(&self, id: u64) -> Result<Chirp> {
        self.read()
            .chirps
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    /// Delete a chirp; only its author may do so
    pub fn delete_chirp(&self, id: u64, requester_id: u64) -> Result<()> {
        let mut snapshot = self.write();

        let chirp = snapshot.chirps.get(&id).ok_or(AppError::NotFound)?;
        if chirp.author_id != requester_id {
            tracing::warn!(
                "User {} attempted to delete chirp {} owned by user {}",
                requester_id,
                id,
                chirp.author_id
            );
            return Err(AppError::Forbidden);
        }

        snapshot.chirps.remove(&id);
        self.persist(&snapshot)?;
        Ok(())
    }

    // =========================================================================
    // Refresh tokens
    // =========================================================================

    pub fn put_refresh_token(&self, record: RefreshTokenRecord) -> Result<()> {
        let mut snapshot = self.write();
        snapshot.refresh_tokens.insert(record.token.clone(), record);
        self.persist(&snapshot)?;
        Ok(())
    }

    pub fn get_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord> {
        self.read()
            .refresh_tokens
            .get(token)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    /// Mark a refresh token revoked (tombstone, never deleted)
    pub fn revoke_refresh_token(&self, token: &str) -> Result<()> {
        let mut snapshot = self.write();

        let record = snapshot
            .refresh_tokens
            .get_mut(token)
            .ok_or(AppError::NotFound)?;
        record.revoked = true;

        self.persist(&snapshot)?;
        Ok(())
    }

    /// Revoke every refresh token owned by a user (used on password change)
    pub fn revoke_refresh_tokens_for_user(&self, user_id: u64) -> Result<()> {
        let mut snapshot = self.write();

        let mut changed = false;
        for record in snapshot.refresh_tokens.values_mut() {
            if record.user_id == user_id && !record.revoked {
                record.revoked = true;
                changed = true;
            }
        }

        if changed {
            self.persist(&snapshot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_test_store(dir: &TempDir) -> Db {
        open_database(dir.path().join("test.json")).expect("open store")
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);
        assert!(store.list_chirps(SortOrder::Ascending).is_empty());
    }

    #[test]
    fn test_open_corrupt_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.json");
        fs::write(&path, "{ not json").unwrap();

        match open_database(&path) {
            Err(AppError::StorageCorrupt(_)) => {}
            other => panic!("expected StorageCorrupt, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_create_user_assigns_monotonic_ids() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);

        let alice = store.create_user("alice@example.com", "hash-a").unwrap();
        let bob = store.create_user("bob@example.com", "hash-b").unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert!(!alice.is_chirpy_red);
    }

    #[test]
    fn test_create_user_duplicate_email() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);

        store.create_user("alice@example.com", "hash-a").unwrap();
        let err = store.create_user("alice@example.com", "hash-b");
        assert!(matches!(err, Err(AppError::DuplicateEmail)));
    }

    #[test]
    fn test_email_compare_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);

        store.create_user("alice@example.com", "hash-a").unwrap();
        // Different case is a different email as stored
        assert!(store.create_user("Alice@example.com", "hash-b").is_ok());
    }

    #[test]
    fn test_update_user_partial() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);

        let alice = store.create_user("alice@example.com", "hash-a").unwrap();

        let updated = store
            .update_user(alice.id, Some("alice2@example.com"), None, None)
            .unwrap();
        assert_eq!(updated.email, "alice2@example.com");
        assert_eq!(updated.password_hash, "hash-a");

        let updated = store
            .update_user(alice.id, None, None, Some(true))
            .unwrap();
        assert!(updated.is_chirpy_red);
        assert_eq!(updated.email, "alice2@example.com");
    }

    #[test]
    fn test_update_user_email_collision() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);

        let alice = store.create_user("alice@example.com", "hash-a").unwrap();
        store.create_user("bob@example.com", "hash-b").unwrap();

        let err = store.update_user(alice.id, Some("bob@example.com"), None, None);
        assert!(matches!(err, Err(AppError::DuplicateEmail)));

        // Keeping your own email is not a collision
        assert!(store
            .update_user(alice.id, Some("alice@example.com"), None, None)
            .is_ok());
    }

    #[test]
    fn test_update_missing_user() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);
        let err = store.update_user(42, Some("x@y"), None, None);
        assert!(matches!(err, Err(AppError::NotFound)));
    }

    #[test]
    fn test_create_chirp_requires_existing_author() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);
        let err = store.create_chirp("hello", 42);
        assert!(matches!(err, Err(AppError::NotFound)));
    }

    #[test]
    fn test_list_chirps_sorting() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);
        let alice = store.create_user("alice@example.com", "h").unwrap();

        store.create_chirp("first", alice.id).unwrap();
        store.create_chirp("second", alice.id).unwrap();
        store.create_chirp("third", alice.id).unwrap();

        let asc = store.list_chirps(SortOrder::Ascending);
        assert_eq!(
            asc.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        let desc = store.list_chirps(SortOrder::Descending);
        assert_eq!(
            desc.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );
    }

    #[test]
    fn test_delete_chirp_author_only() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);
        let alice = store.create_user("alice@example.com", "h").unwrap();
        let bob = store.create_user("bob@example.com", "h").unwrap();
        let chirp = store.create_chirp("hello", alice.id).unwrap();

        let err = store.delete_chirp(chirp.id, bob.id);
        assert!(matches!(err, Err(AppError::Forbidden)));
        // Still there
        assert!(store.get_chirp_by_id(chirp.id).is_ok());

        store.delete_chirp(chirp.id, alice.id).unwrap();
        assert!(matches!(
            store.get_chirp_by_id(chirp.id),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn test_reload_round_trip_preserves_everything() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.json");

        let (alice, chirp) = {
            let store = open_database(&path).unwrap();
            let alice = store.create_user("alice@example.com", "$argon2id$x").unwrap();
            let chirp = store.create_chirp("hello world", alice.id).unwrap();
            store
                .put_refresh_token(RefreshTokenRecord {
                    token: "ab".repeat(32),
                    user_id: alice.id,
                    expires_at: 9_999_999_999,
                    revoked: false,
                })
                .unwrap();
            (alice, chirp)
        };

        let store = open_database(&path).unwrap();
        let reloaded_user = store.get_user_by_id(alice.id).unwrap();
        assert_eq!(reloaded_user.email, alice.email);
        assert_eq!(reloaded_user.password_hash, alice.password_hash);
        assert_eq!(reloaded_user.is_chirpy_red, alice.is_chirpy_red);

        let reloaded_chirp = store.get_chirp_by_id(chirp.id).unwrap();
        assert_eq!(reloaded_chirp.body, chirp.body);
        assert_eq!(reloaded_chirp.author_id, chirp.author_id);

        let record = store.get_refresh_token(&"ab".repeat(32)).unwrap();
        assert_eq!(record.user_id, alice.id);
        assert!(!record.revoked);
    }

    #[test]
    fn test_counters_survive_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.json");

        {
            let store = open_database(&path).unwrap();
            let alice = store.create_user("alice@example.com", "h").unwrap();
            let chirp = store.create_chirp("one", alice.id).unwrap();
            // Delete the only chirp; the counter must not go backward
            store.delete_chirp(chirp.id, alice.id).unwrap();
        }

        let store = open_database(&path).unwrap();
        let alice = store.get_user_by_id(1).unwrap();
        let chirp = store.create_chirp("two", alice.id).unwrap();
        assert_eq!(chirp.id, 2, "chirp id must never be reused");

        let bob = store.create_user("bob@example.com", "h").unwrap();
        assert_eq!(bob.id, 2, "user id counter must continue after reload");
    }

    #[test]
    fn test_concurrent_writers_get_distinct_ids() {
        use std::thread;

        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);
        let alice = store.create_user("alice@example.com", "h").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let author = alice.id;
                thread::spawn(move || {
                    (0..5)
                        .map(|j| store.create_chirp(&format!("chirp {i}-{j}"), author).unwrap().id)
                        .collect::<Vec<u64>>()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 40, "every accepted chirp has a distinct id");
        assert_eq!(store.list_chirps(SortOrder::Ascending).len(), 40);
    }

    #[test]
    fn test_revoke_refresh_token() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);
        let token = "cd".repeat(32);

        store
            .put_refresh_token(RefreshTokenRecord {
                token: token.clone(),
                user_id: 1,
                expires_at: 9_999_999_999,
                revoked: false,
            })
            .unwrap();

        store.revoke_refresh_token(&token).unwrap();
        // Tombstoned, not deleted
        let record = store.get_refresh_token(&token).unwrap();
        assert!(record.revoked);

        // Unknown token is a store-level NotFound; callers decide what that means
        assert!(matches!(
            store.revoke_refresh_token("unknown"),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn test_revoke_all_for_user() {
        let dir = TempDir::new().unwrap();
        let store = open_test_store(&dir);

        for (i, owner) in [(0u8, 1u64), (1, 1), (2, 2)] {
            store
                .put_refresh_token(RefreshTokenRecord {
                    token: format!("{:02x}", i).repeat(32),
                    user_id: owner,
                    expires_at: 9_999_999_999,
                    revoked: false,
                })
                .unwrap();
        }

        store.revoke_refresh_tokens_for_user(1).unwrap();

        assert!(store.get_refresh_token(&"00".repeat(32)).unwrap().revoked);
        assert!(store.get_refresh_token(&"01".repeat(32)).unwrap().revoked);
        assert!(!store.get_refresh_token(&"02".repeat(32)).unwrap().revoked);
    }
}

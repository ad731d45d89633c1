//! Durable session storage.
//!
//! Two fixed keys hold the bearer token and the serialized user snapshot.
//! Storage is the sole durability mechanism: the in-memory session must be
//! rehydratable from it alone on process start. All failures degrade soft —
//! a read that cannot be parsed behaves like an absent value, and a write
//! that cannot land is logged and dropped, never propagated.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use portal_client::{TokenStore, User};
use tracing::warn;

pub const TOKEN_KEY: &str = "member_portal_token";
pub const USER_KEY: &str = "member_portal_user";

/// Scoped key-value persistence for the session.
pub trait SessionStore: Send + Sync {
    fn set_token(&self, token: &str);
    fn token(&self) -> Option<String>;
    fn remove_token(&self);

    fn set_user(&self, user: &User);
    fn user(&self) -> Option<User>;
    fn remove_user(&self);
}

fn serialize_user(user: &User) -> Option<String> {
    match serde_json::to_string(user) {
        Ok(raw) => Some(raw),
        Err(err) => {
            warn!(error = %err, "failed to serialize user snapshot");
            None
        }
    }
}

fn parse_user(raw: &str) -> Option<User> {
    match serde_json::from_str(raw) {
        Ok(user) => Some(user),
        Err(err) => {
            // Corrupt snapshot reads as logged-out, never as a crash.
            warn!(error = %err, "failed to parse stored user snapshot");
            None
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, key: &str, value: String) {
        self.values.lock().unwrap().insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

impl SessionStore for MemoryStore {
    fn set_token(&self, token: &str) {
        self.set(TOKEN_KEY, token.to_string());
    }

    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }

    fn remove_token(&self) {
        self.remove(TOKEN_KEY);
    }

    fn set_user(&self, user: &User) {
        if let Some(raw) = serialize_user(user) {
            self.set(USER_KEY, raw);
        }
    }

    fn user(&self) -> Option<User> {
        self.get(USER_KEY).and_then(|raw| parse_user(&raw))
    }

    fn remove_user(&self) {
        self.remove(USER_KEY);
    }
}

impl TokenStore for MemoryStore {
    fn bearer(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }

    fn clear(&self) {
        self.remove(TOKEN_KEY);
    }
}

/// File-backed store: one file per key under a data directory.
///
/// Each key's write goes through a temp file and a rename, so a write is
/// atomic per key. Token and user remain two independent writes, not a
/// transaction; the session manager treats a half-present pair as corrupt.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(error = %err, dir = %self.dir.display(), "failed to create session data dir");
            return;
        }
        let path = self.path(key);
        let tmp = self.dir.join(format!("{key}.tmp"));
        if let Err(err) = fs::write(&tmp, value).and_then(|_| fs::rename(&tmp, &path)) {
            warn!(error = %err, key, "failed to persist session value");
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    fn remove(&self, key: &str) {
        if let Err(err) = fs::remove_file(self.path(key)) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %err, key, "failed to remove session value");
            }
        }
    }
}

impl SessionStore for FileStore {
    fn set_token(&self, token: &str) {
        self.set(TOKEN_KEY, token);
    }

    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }

    fn remove_token(&self) {
        self.remove(TOKEN_KEY);
    }

    fn set_user(&self, user: &User) {
        if let Some(raw) = serialize_user(user) {
            self.set(USER_KEY, &raw);
        }
    }

    fn user(&self) -> Option<User> {
        self.get(USER_KEY).and_then(|raw| parse_user(&raw))
    }

    fn remove_user(&self) {
        self.remove(USER_KEY);
    }
}

impl TokenStore for FileStore {
    fn bearer(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }

    fn clear(&self) {
        self.remove(TOKEN_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use portal_client::{Gender, UserRole};

    fn sample_user() -> User {
        User {
            id: "42".into(),
            uuid: "u-42".into(),
            email: "a@b.co".into(),
            is_email_verified: true,
            is_detail_completed: false,
            full_name: "Budi Santoso".into(),
            phone_number: "081234567890".into(),
            gender: Gender::Male,
            birth_date: "1999-04-01".into(),
            university: "".into(),
            address: "".into(),
            birth_place: "".into(),
            initial_name: "".into(),
            role: UserRole::User,
            registration_date: Utc::now(),
        }
    }

    #[test]
    fn memory_store_round_trips_token_and_user() {
        let store = MemoryStore::new();
        assert_eq!(store.token(), None);
        assert!(store.user().is_none());

        store.set_token("tok");
        store.set_user(&sample_user());
        assert_eq!(store.token(), Some("tok".into()));
        assert_eq!(store.user().map(|u| u.id), Some("42".into()));

        store.remove_token();
        store.remove_user();
        assert_eq!(store.token(), None);
        assert!(store.user().is_none());
    }

    #[test]
    fn file_store_round_trips_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = FileStore::new(dir.path());
            store.set_token("tok");
            store.set_user(&sample_user());
        }

        // A fresh instance over the same directory sees the same session.
        let store = FileStore::new(dir.path());
        assert_eq!(store.token(), Some("tok".into()));
        assert_eq!(store.user().map(|u| u.email), Some("a@b.co".into()));
    }

    #[test]
    fn malformed_user_snapshot_reads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(USER_KEY), "{not json").expect("write garbage");

        let store = FileStore::new(dir.path());
        assert!(store.user().is_none());
    }

    #[test]
    fn token_store_view_clears_only_the_token() {
        let store = MemoryStore::new();
        store.set_token("tok");
        store.set_user(&sample_user());

        TokenStore::clear(&store);
        assert_eq!(store.token(), None);
        assert!(store.user().is_some());
    }
}

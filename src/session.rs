//! Session state: the authenticated identity and its bearer credential.
//!
//! A session is either fully present (user and token) or fully absent. It is persisted under
//! two well-known storage keys with a bounded expiry, so a restart within the expiry window
//! restores the session without re-authenticating.

use crate::storage::Storage;
use chrono::Duration;
use serde::{Deserialize, Serialize};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// How long a persisted session stays valid. Matches the lifetime of the bearer tokens the
/// remote store issues.
pub const SESSION_TTL_HOURS: i64 = 1;

/// The identity the remote store reported at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: i64,
    username: String,
    email: String,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// An authenticated session: who, plus the credential that proves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user: User,
    token: String,
}

impl Session {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Owns session persistence. Construction, restoration and teardown are explicit; nothing
/// else writes the session keys.
#[derive(Debug)]
pub struct SessionStore {
    storage: Storage,
}

impl SessionStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Attempts to restore a previously persisted session. Absence (nothing stored, or the
    /// stored entries have expired) is a normal outcome, not an error. A token without a user
    /// or vice versa is treated as absent and cleaned up, preserving the all-or-nothing
    /// session invariant.
    pub fn restore(&mut self) -> Option<Session> {
        let token: Option<String> = self.storage.get(TOKEN_KEY);
        let user: Option<User> = self.storage.get(USER_KEY);
        match (token, user) {
            (Some(token), Some(user)) => Some(Session::new(user, token)),
            (None, None) => None,
            _ => {
                self.clear();
                None
            }
        }
    }

    /// Persists `session` under the well-known keys with the bounded session expiry.
    pub fn save(&mut self, session: &Session) {
        let ttl = Some(Duration::hours(SESSION_TTL_HOURS));
        self.storage.set(TOKEN_KEY, &session.token(), ttl);
        self.storage.set(USER_KEY, session.user(), ttl);
    }

    /// Clears the persisted session. Best effort and synchronous; always succeeds.
    pub fn clear(&mut self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(User::new(7, "ada", "ada@example.com"), "tok-123")
    }

    #[test]
    fn test_save_and_restore() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::new(Storage::new(dir.path()));
        store.save(&session());

        let restored = store.restore().unwrap();
        assert_eq!(restored, session());
    }

    #[test]
    fn test_restore_from_fresh_storage_is_none() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::new(Storage::new(dir.path()));
        assert!(store.restore().is_none());
    }

    #[test]
    fn test_restore_survives_process_restart() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = SessionStore::new(Storage::new(dir.path()));
            store.save(&session());
        }
        // A brand new store over the same directory sees the session.
        let mut store = SessionStore::new(Storage::new(dir.path()));
        assert_eq!(store.restore(), Some(session()));
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::new(Storage::new(dir.path()));
        store.save(&session());
        store.clear();
        assert!(store.restore().is_none());
        assert!(!dir.path().join("token.json").exists());
        assert!(!dir.path().join("user.json").exists());
    }

    #[test]
    fn test_partial_state_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::new(Storage::new(dir.path()));
        store.save(&session());
        // Simulate a lost user entry.
        std::fs::remove_file(dir.path().join("user.json")).unwrap();

        let mut store = SessionStore::new(Storage::new(dir.path()));
        assert!(store.restore().is_none());
        // The orphaned token was cleaned up too.
        assert!(!dir.path().join("token.json").exists());
    }
}

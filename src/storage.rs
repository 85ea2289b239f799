//! Scoped key-value persistence for session state.
//!
//! Each key is one JSON file under the storage root, wrapped in an envelope that can carry an
//! expiry timestamp. Entries past their expiry read as absent. A storage layer that cannot
//! write (missing permissions, unusable directory) degrades to in-memory-only entries with a
//! warning; it never surfaces an error to callers.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl Envelope {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= Utc::now(),
            None => false,
        }
    }
}

/// A small file-backed store with per-entry expiry.
#[derive(Debug)]
pub struct Storage {
    root: PathBuf,
    /// Entries held here when the filesystem is unusable.
    memory: HashMap<String, Envelope>,
}

impl Storage {
    /// Creates a storage rooted at `root`. The directory is created if missing; failure to
    /// create it is logged and the storage runs memory-only.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if let Err(e) = std::fs::create_dir_all(&root) {
            warn!(
                "Unable to create storage directory '{}', falling back to in-memory session \
                state: {e}",
                root.display()
            );
        }
        Self {
            root,
            memory: HashMap::new(),
        }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Stores `value` under `key`, optionally expiring after `ttl`.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T, ttl: Option<Duration>) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!("Unable to serialize storage entry '{key}': {e}");
                return;
            }
        };
        let envelope = Envelope {
            value,
            expires_at: ttl.map(|ttl| Utc::now() + ttl),
        };

        match serde_json::to_string_pretty(&envelope) {
            Ok(json) => {
                let path = self.file_path(key);
                match std::fs::write(&path, json) {
                    Ok(()) => {
                        restrict_permissions(&path);
                        self.memory.remove(key);
                    }
                    Err(e) => {
                        warn!(
                            "Unable to persist storage entry '{key}' at '{}', keeping it in \
                            memory only: {e}",
                            path.display()
                        );
                        self.memory.insert(key.to_string(), envelope);
                    }
                }
            }
            Err(e) => warn!("Unable to serialize storage entry '{key}': {e}"),
        }
    }

    /// Reads the entry stored under `key`. Absent, unparseable and expired entries all read
    /// as `None`; expired entries are removed on the way out.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let envelope = self.load_envelope(key)?;
        if envelope.is_expired() {
            debug!("Storage entry '{key}' has expired");
            self.remove(key);
            return None;
        }
        match serde_json::from_value(envelope.value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Storage entry '{key}' is unreadable, treating it as absent: {e}");
                None
            }
        }
    }

    /// Removes the entry stored under `key`. Best effort; never fails.
    pub fn remove(&mut self, key: &str) {
        self.memory.remove(key);
        let path = self.file_path(key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Unable to remove storage entry at '{}': {e}", path.display());
            }
        }
    }

    fn load_envelope(&mut self, key: &str) -> Option<Envelope> {
        let path = self.file_path(key);
        match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(envelope) => Some(envelope),
                Err(e) => {
                    warn!(
                        "Storage entry at '{}' is corrupt, treating it as absent: {e}",
                        path.display()
                    );
                    None
                }
            },
            Err(_) => self.memory.get(key).cloned(),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, Permissions::from_mode(0o600)) {
        warn!("Unable to set permissions on '{}': {e}", path.display());
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut storage = Storage::new(dir.path());
        storage.set("token", &"abc123".to_string(), None);
        let token: Option<String> = storage.get("token");
        assert_eq!(token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_get_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let mut storage = Storage::new(dir.path());
        let value: Option<String> = storage.get("nothing");
        assert!(value.is_none());
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let mut storage = Storage::new(dir.path());
        storage.set("token", &"abc123".to_string(), Some(Duration::seconds(-1)));
        let token: Option<String> = storage.get("token");
        assert!(token.is_none());
        // The expired file was removed, not just skipped.
        assert!(!dir.path().join("token.json").exists());
    }

    #[test]
    fn test_unexpired_ttl_survives() {
        let dir = TempDir::new().unwrap();
        let mut storage = Storage::new(dir.path());
        storage.set("token", &"abc123".to_string(), Some(Duration::hours(1)));
        let token: Option<String> = storage.get("token");
        assert_eq!(token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().unwrap();
        let mut storage = Storage::new(dir.path());
        storage.set("user", &"someone".to_string(), None);
        storage.remove("user");
        let value: Option<String> = storage.get("user");
        assert!(value.is_none());
    }

    #[test]
    fn test_corrupt_entry_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let mut storage = Storage::new(dir.path());
        std::fs::write(dir.path().join("token.json"), "not json at all").unwrap();
        let value: Option<String> = storage.get("token");
        assert!(value.is_none());
    }

    #[test]
    fn test_degrades_to_memory_when_root_is_unwritable() {
        let dir = TempDir::new().unwrap();
        // A file where the directory should be makes every write fail.
        let bogus_root = dir.path().join("occupied");
        std::fs::write(&bogus_root, "i am a file").unwrap();

        let mut storage = Storage::new(&bogus_root);
        storage.set("token", &"abc123".to_string(), None);
        let token: Option<String> = storage.get("token");
        assert_eq!(token.as_deref(), Some("abc123"));
        // Memory-only entries survive repeated reads.
        let again: Option<String> = storage.get("token");
        assert_eq!(again.as_deref(), Some("abc123"));
    }

    #[cfg(unix)]
    #[test]
    fn test_persisted_entry_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let mut storage = Storage::new(dir.path());
        storage.set("token", &"abc123".to_string(), None);
        let mode = std::fs::metadata(dir.path().join("token.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

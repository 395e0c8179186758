// Durable storage for the session token.
//
// The session manager persists through the `CredentialStore` trait only.
// This crate ships a JSON file backing and an in-memory one; the keyring
// backing lives in `eero-config` next to the rest of the platform glue.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Key-value durable cell holding one opaque session token.
pub trait CredentialStore: Send + Sync {
    /// Read the persisted token. `Ok(None)` when nothing is stored.
    fn load(&self) -> Result<Option<SecretString>, Error>;

    /// Persist `token`, replacing any previous value.
    fn save(&self, token: &SecretString) -> Result<(), Error>;

    /// Remove the persisted token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), Error>;
}

// ── File backing ────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct SessionFile {
    session_token: String,
}

/// Stores the token as `{"session_token": "..."}` in a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, Error> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::credential_store(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let file: SessionFile = serde_json::from_str(&contents).map_err(|e| {
            Error::credential_store(format!("corrupt session file {}: {e}", self.path.display()))
        })?;

        if file.session_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::from(file.session_token)))
    }

    fn save(&self, token: &SecretString) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::credential_store)?;
        }

        let body = serde_json::to_string(&SessionFile {
            session_token: token.expose_secret().to_owned(),
        })
        .map_err(Error::credential_store)?;

        let mut file = open_owner_only(&self.path).map_err(|e| {
            Error::credential_store(format!("cannot open {}: {e}", self.path.display()))
        })?;
        file.write_all(body.as_bytes()).map_err(|e| {
            Error::credential_store(format!("cannot write {}: {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), "session token persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session token removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::credential_store(format!(
                "cannot remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// Open `path` for writing, truncated. On unix the file is created
/// `0600`, and an existing file is narrowed to `0600` before any byte of
/// the token is written.
fn open_owner_only(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let file = options.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(file)
}

// ── Memory backing ──────────────────────────────────────────────────

/// Ephemeral store for tests and `--no-persist` style usage.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    token: Option<SecretString>,
    saves: usize,
    clears: usize,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as if persisted by an earlier run.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut state) = store.inner.lock() {
            state.token = Some(SecretString::from(token.into()));
        }
        store
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|s| s.saves).unwrap_or_default()
    }

    /// Number of `clear` calls.
    pub fn clear_count(&self) -> usize {
        self.inner.lock().map(|s| s.clears).unwrap_or_default()
    }

    /// The stored token in the clear (tests only need this).
    pub fn peek(&self) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|s| s.token.as_ref().map(|t| t.expose_secret().to_owned()))
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, Error> {
        self.inner
            .lock()
            .map_err(|_| Error::credential_store("memory store lock poisoned"))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, Error> {
        Ok(self.state()?.token.clone())
    }

    fn save(&self, token: &SecretString) -> Result<(), Error> {
        let mut state = self.state()?;
        state.token = Some(token.clone());
        state.saves += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        let mut state = self.state()?;
        state.token = None;
        state.clears += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().unwrap().is_none());

        store.save(&SecretString::from("tok-123")).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"session_token\":\"tok-123\""));
        assert_eq!(store.load().unwrap().unwrap().expose_secret(), "tok-123");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing again is a no-op.
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        store.save(&SecretString::from("tok")).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_narrows_existing_file_before_writing() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"session_token":"old-and-much-longer-token"}"#).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileCredentialStore::new(&path);
        store.save(&SecretString::from("new")).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        // Truncated, not overlaid on the longer previous token.
        assert_eq!(store.load().unwrap().unwrap().expose_secret(), "new");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileCredentialStore::new(path).load().unwrap_err();
        assert!(matches!(err, Error::CredentialStore { .. }));
    }

    #[test]
    fn memory_store_counts_writes() {
        let store = MemoryCredentialStore::with_token("seed");
        assert_eq!(store.peek().as_deref(), Some("seed"));
        assert_eq!(store.save_count(), 0);

        store.save(&SecretString::from("next")).unwrap();
        store.clear().unwrap();
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.clear_count(), 1);
        assert!(store.load().unwrap().is_none());
    }
}

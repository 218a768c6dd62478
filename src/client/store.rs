//! Token storage primitives. A store holds at most one session token; writes
//! replace the previous value (last write wins) and there is no locking across
//! processes sharing the same file.

use crate::client::ClientError;
use secrecy::{ExposeSecret, SecretString};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

pub trait TokenStore: Send + Sync {
    /// Returns the stored token, or `None` when nothing (or an empty value) is stored.
    fn get(&self) -> Option<SecretString>;

    /// Persists `token`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, token: SecretString) -> Result<(), ClientError>;

    /// Removes the stored token. Clearing an empty store succeeds.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be modified.
    fn clear(&self) -> Result<(), ClientError>;
}

/// In-process store. The server seeds one per request from the `token` cookie.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<SecretString>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: Option<SecretString>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.expose_secret().is_empty())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    // A poisoned lock still holds a whole `Option`, so every path recovers it.
    fn get(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: SecretString) -> Result<(), ClientError> {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token).filter(|t| !t.expose_secret().is_empty());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        Ok(())
    }
}

/// File-backed store used by the CLI so a login survives between invocations.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<SecretString> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let token = contents.trim();
        if token.is_empty() {
            None
        } else {
            Some(SecretString::from(token.to_string()))
        }
    }

    fn set(&self, token: SecretString) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| storage_error(&self.path, &err))?;
        }
        write_private(&self.path, token.expose_secret())
            .map_err(|err| storage_error(&self.path, &err))
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error(&self.path, &err)),
        }
    }
}

fn storage_error(path: &Path, err: &io::Error) -> ClientError {
    ClientError::Storage(format!("{}: {err}", path.display()))
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten files that already existed.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_last_write_wins() {
        let store = MemoryTokenStore::new();
        assert!(store.get().is_none());

        store.set(SecretString::from("first")).unwrap();
        store.set(SecretString::from("second")).unwrap();
        assert_eq!(store.get().unwrap().expose_secret(), "second");

        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn memory_store_ignores_empty_tokens() {
        let store = MemoryTokenStore::with_token(Some(SecretString::from("")));
        assert!(store.get().is_none());

        store.set(SecretString::from("")).unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn memory_store_survives_a_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryTokenStore::with_token(Some(SecretString::from(
            "jwt-1",
        ))));
        let holder = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = holder.token.write().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();
        assert!(store.token.is_poisoned());

        assert_eq!(store.get().unwrap().expose_secret(), "jwt-1");
        store.set(SecretString::from("jwt-2")).unwrap();
        assert_eq!(store.get().unwrap().expose_secret(), "jwt-2");
        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("token"));
        assert!(store.get().is_none());

        store.set(SecretString::from("jwt-value")).unwrap();
        assert_eq!(store.get().unwrap().expose_secret(), "jwt-value");

        store.clear().unwrap();
        assert!(store.get().is_none());
        // Clearing twice is not an error.
        store.clear().unwrap();
    }

    #[test]
    fn file_store_trims_whitespace_and_treats_blank_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        fs::write(&path, "  jwt-value\n").unwrap();
        let store = FileTokenStore::new(&path);
        assert_eq!(store.get().unwrap().expose_secret(), "jwt-value");

        fs::write(&path, "\n").unwrap();
        assert!(store.get().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_store_writes_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token"));
        store.set(SecretString::from("jwt-value")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

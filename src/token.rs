//! Local token cache
//!
//! The backend hands the access token back in the login response as well as
//! in `access_token_cookie`. The cookie is the credential the server reads;
//! the local copy survives restarts and backs the startup token check.

use crate::error::ClientError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Key under which the token is persisted
pub const ACCESS_TOKEN_KEY: &str = "access_token";

pub trait TokenStore: Send + Sync + 'static {
    fn load(&self) -> Result<Option<String>, ClientError>;

    fn save(&self, token: &str) -> Result<(), ClientError>;

    /// Removing a token that was never stored is not an error
    fn clear(&self) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.token.read().clone())
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.token.write() = None;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredToken {
    access_token: Option<String>,
}

/// Token persisted as TOML next to the config file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(store_error)?;
        let stored: StoredToken = toml::from_str(&contents).map_err(store_error)?;

        Ok(stored.access_token.filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(store_error)?;
            }
        }

        let stored = StoredToken {
            access_token: Some(token.to_string()),
        };
        let toml_string = toml::to_string_pretty(&stored).map_err(store_error)?;
        fs::write(&self.path, toml_string).map_err(store_error)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_error(e)),
        }
    }
}

fn store_error(err: impl std::fmt::Display) -> ClientError {
    ClientError::Store(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_token_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("timetrack-tui-test-{}", std::process::id()))
            .join(format!("{name}.toml"))
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save("T1").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("T1"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_missing_file_is_none() {
        let store = FileTokenStore::new(temp_token_path("missing"));
        assert_eq!(store.load().unwrap(), None);
        // Clearing an absent file is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_save_load_clear() {
        let path = temp_token_path("save-load");
        let store = FileTokenStore::new(&path);

        store.save("eyJhbGciOiJIUzI1NiJ9.payload.sig").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains(ACCESS_TOKEN_KEY));
        assert_eq!(
            store.load().unwrap().as_deref(),
            Some("eyJhbGciOiJIUzI1NiJ9.payload.sig")
        );

        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let path = temp_token_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "access_token = [").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(matches!(store.load(), Err(ClientError::Store(_))));
        store.clear().unwrap();
    }
}

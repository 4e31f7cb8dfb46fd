//! Durable token storage
//!
//! This module provides:
//! - `TokenStore` trait defining the interface for the persisted token slot
//! - `FileTokenStore` implementing it over a plain file
//! - `MemoryTokenStore` for tests
//!
//! The slot holds at most one bearer token; absence means logged out. The
//! session manager is the only writer - UI code reads session state from
//! memory and never touches the store directly.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Error type for token store operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read token from '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to write token to '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to clear token at '{path}': {source}")]
    Clear {
        path: String,
        source: std::io::Error,
    },
}

/// Durable storage for the session token
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any
    async fn load(&self) -> Result<Option<String>, StorageError>;

    /// Persist a token, replacing any previous one
    async fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Erase the persisted token; clearing an empty slot is not an error
    async fn clear(&self) -> Result<(), StorageError>;
}

/// File-backed token store
///
/// Persists the raw token string at a configurable path so a session
/// survives restarts.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a new file-backed store
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create a boxed store for use with dependency injection
    pub fn boxed(path: PathBuf) -> Arc<dyn TokenStore> {
        Arc::new(Self::new(path))
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                path: self.display_path(),
                source: e,
            }),
        }
    }

    async fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::Write {
                        path: self.display_path(),
                        source: e,
                    })?;
            }
        }

        tokio::fs::write(&self.path, token)
            .await
            .map_err(|e| StorageError::Write {
                path: self.display_path(),
                source: e,
            })
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Clear {
                path: self.display_path(),
                source: e,
            }),
        }
    }
}

/// In-memory token store for tests
#[derive(Default)]
pub struct MemoryTokenStore {
    token: std::sync::RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Arc<dyn TokenStore> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.read().expect("token lock poisoned").clone())
    }

    async fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.token.write().expect("token lock poisoned") = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.token.write().expect("token lock poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileTokenStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = FileTokenStore::new(dir.path().join("session_token"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let (_dir, store) = temp_store();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let (_dir, store) = temp_store();

        store.save("t1").await.expect("Failed to save token");
        assert_eq!(store.load().await.unwrap(), Some("t1".to_string()));

        // Replacing an existing token
        store.save("t2").await.expect("Failed to save token");
        assert_eq!(store.load().await.unwrap(), Some("t2".to_string()));
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = FileTokenStore::new(dir.path().join("nested/deeper/session_token"));

        store.save("t1").await.expect("Failed to save token");
        assert_eq!(store.load().await.unwrap(), Some("t1".to_string()));
    }

    #[tokio::test]
    async fn test_clear_removes_token() {
        let (_dir, store) = temp_store();

        store.save("t1").await.expect("Failed to save token");
        store.clear().await.expect("Failed to clear token");
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_missing_file_succeeds() {
        let (_dir, store) = temp_store();
        store.clear().await.expect("Clearing an empty slot failed");
    }

    #[tokio::test]
    async fn test_whitespace_only_file_is_none() {
        let (_dir, store) = temp_store();
        store.save("   \n").await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();

        assert_eq!(store.load().await.unwrap(), None);
        store.save("t1").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("t1".to_string()));
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}

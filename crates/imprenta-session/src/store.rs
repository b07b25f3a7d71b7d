//! Token persistence: the single key→token cell that survives restarts.
//!
//! The [`SessionManager`](crate::SessionManager) is the only writer. A
//! missing key means "no session"; anything unreadable is reported as
//! [`SessionError::Storage`] and the manager purges it.

use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::SessionError;

/// Persisted storage for the raw token.
pub trait TokenStore: Send + Sync + 'static {
    /// Reads the token stored under `key`, if any.
    fn load(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, SessionError>> + Send;

    /// Stores `token` under `key`, replacing any previous value.
    fn save(
        &self,
        key: &str,
        token: &str,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Deletes `key`. Deleting a missing key is not an error.
    fn remove(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// A process-local store. Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token` under `key`.
    pub fn with_token(key: &str, token: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), token.to_string());
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    async fn load(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, token: &str) -> Result<(), SessionError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), token.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileTokenStore
// ---------------------------------------------------------------------------

/// A store backed by a small JSON object file: `{"authToken": "<token>"}`.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves either the old file or the new one.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file. `Ok(None)` when it doesn't exist.
    async fn read_entries(
        &self,
    ) -> Result<Option<HashMap<String, String>>, SessionError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(&self.path, e)),
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            SessionError::Storage(format!(
                "{} is corrupt: {e}",
                self.path.display()
            ))
        })
    }

    async fn write_entries(
        &self,
        entries: &HashMap<String, String>,
    ) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| storage_error(parent, e))?;
            }
        }
        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| storage_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_error(&self.path, e))
    }
}

fn storage_error(path: &Path, e: std::io::Error) -> SessionError {
    SessionError::Storage(format!("{}: {e}", path.display()))
}

impl TokenStore for FileTokenStore {
    async fn load(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self.read_entries().await?;
        Ok(entries
            .and_then(|mut map| map.remove(key))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty()))
    }

    async fn save(&self, key: &str, token: &str) -> Result<(), SessionError> {
        // A corrupt file is replaced rather than blocking the login.
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries.unwrap_or_default(),
            Err(SessionError::Storage(reason)) => {
                tracing::warn!(%reason, "overwriting unreadable token file");
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), token.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        match self.read_entries().await {
            Ok(None) => Ok(()),
            Ok(Some(mut entries)) => {
                if entries.remove(key).is_none() {
                    return Ok(());
                }
                self.write_entries(&entries).await
            }
            // Unparseable: the only way to purge the key is to drop the file.
            Err(_) => match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(storage_error(&self.path, e)),
            },
        }
    }
}

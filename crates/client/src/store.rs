//! Key/value store implementations.
//!
//! [`MemoryStore`] covers tests and short-lived processes; [`JsonFileStore`]
//! persists to a JSON file so session state survives restarts, which is what
//! the re-authentication flow relies on.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::traits::KeyValueStore;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted file is not valid JSON.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// In-memory store. Values do not survive the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store persisting a flat JSON object.
///
/// Every write rewrites the whole file under an internal lock; the state is
/// a handful of short strings so the simplicity wins over an embedded
/// database.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    guard: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by `path`. The file is created lazily on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), guard: tokio::sync::Mutex::new(()) }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(map)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.guard.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.guard.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await?;
        debug!(key, path = %self.path.display(), "persisted session value");
        Ok(())
    }
}

//! Session storage
//!
//! Key/value persistence for the session store. Two backends:
//! - `MemoryStore` for tests and ephemeral runs
//! - `FileStore` persisting a JSON map on disk between runs
//!
//! The trait mirrors the browser's localStorage surface: string keys,
//! string values, removal.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// String key/value persistence
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store, lost on drop
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

/// JSON-file-backed store.
///
/// The whole map is rewritten on every mutation; session data is a handful
/// of short strings so this stays cheap.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: tokio::sync::RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store at `path`, loading any existing contents.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse session store: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read session store: {}", path.display())
                })
            }
        };
        Ok(Self {
            path,
            entries: tokio::sync::RwLock::new(entries),
        })
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create storage directory: {}", parent.display())
                })?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("Failed to write session store: {}", self.path.display()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        self.persist(&entries).await
    }
}

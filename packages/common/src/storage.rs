//! # Durable Storage
//!
//! Key-value records that survive a restart. Each record is an opaque
//! string (in practice a JSON document) addressed by a short key such as
//! `"siteContent"`.
//!
//! - **DirectoryStorage**: one `<key>.json` file per record
//! - **MemoryStorage**: process-local map, cloneable handle (for tests and
//!   for hosts that persist the records themselves)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid record key: {0:?}")]
    InvalidKey(String),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable record storage
pub trait Storage: Send {
    /// Read a record, `None` if it was never written
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite a record wholesale
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a record (no-op if absent)
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Keys become file names, so keep them to a safe alphabet
pub fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// File-backed storage rooted at a directory
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    /// Open storage at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl Storage for DirectoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let path = self.record_path(key);

        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let path = self.record_path(key);

        // Write to a sibling file first so readers never observe a torn record
        let tmp = self.root.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(key, bytes = value.len(), "Wrote storage record");
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let path = self.record_path(key);

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// In-memory storage. Clones share the same records, like two tabs
/// sharing one browser profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one record
    pub fn with_record(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut records) = storage.records.lock() {
            records.insert(key.to_string(), value.to_string());
        }
        storage
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let mut records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let mut records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        records.remove(key);
        Ok(())
    }
}

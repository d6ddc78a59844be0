//! Archive persistence.
//!
//! The archive is stored as a pretty-printed JSON array. A missing or corrupt
//! file reads as an empty archive; only genuine I/O failures are errors.
//! Array entries that are not valid items survive a load/save cycle untouched.

use crate::archive::item::{ArchiveEntry, Item};
use crate::error::StorageError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load/save access to the ordered archive.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Load the archive, newest first. Absent or unreadable content yields an
    /// empty archive.
    async fn load(&self) -> Result<Vec<ArchiveEntry>, StorageError>;

    /// Replace the whole archive.
    async fn save(&self, entries: &[ArchiveEntry]) -> Result<(), StorageError>;
}

/// Archive stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonArchiveStore {
    path: PathBuf,
}

impl JsonArchiveStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

#[async_trait]
impl ArchiveStore for JsonArchiveStore {
    async fn load(&self) -> Result<Vec<ArchiveEntry>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Archive not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!(path = %self.path.display(), error = %e, "Archive is not valid UTF-8, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::IoError(e)),
        };
        Ok(parse_archive(&raw))
    }

    /// Uses atomic writes (write to .tmp, then rename).
    async fn save(&self, entries: &[ArchiveEntry]) -> Result<(), StorageError> {
        let serialized = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(format!("Failed to serialize archive: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StorageError::IoError(std::io::Error::new(
                        e.kind(),
                        format!("Failed to create archive directory {:?}: {}", parent, e),
                    ))
                })?;
            }
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, serialized.as_bytes())
            .await
            .map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    e.kind(),
                    format!("Failed to write archive to {:?}: {}", temp_path, e),
                ))
            })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file to {:?}: {}", self.path, e),
            )));
        }

        debug!(path = %self.path.display(), entries = entries.len(), "Archive saved");
        Ok(())
    }
}

/// Parse archive JSON leniently: a non-array payload is an empty archive and
/// entries that are not valid items are kept as raw values.
pub fn parse_archive(raw: &str) -> Vec<ArchiveEntry> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Archive is not valid JSON, starting empty");
            return Vec::new();
        }
    };

    let Value::Array(entries) = value else {
        warn!("Archive payload is not an array, starting empty");
        return Vec::new();
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match Item::deserialize(&entry) {
            Ok(item) => ArchiveEntry::Item(item),
            Err(e) => {
                warn!(index, error = %e, "Archive entry is not a valid item, keeping it as is");
                ArchiveEntry::Unreadable(entry)
            }
        })
        .collect()
}

/// Archive held in memory. Useful for embedding the pipeline without a
/// filesystem and in tests.
#[derive(Debug, Default)]
pub struct MemoryArchiveStore {
    entries: Mutex<Vec<ArchiveEntry>>,
    saves: Mutex<usize>,
}

impl MemoryArchiveStore {
    pub fn new(items: Vec<Item>) -> Self {
        Self::with_entries(items.into_iter().map(ArchiveEntry::from).collect())
    }

    pub fn with_entries(entries: Vec<ArchiveEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            saves: Mutex::new(0),
        }
    }

    /// Readable items currently stored.
    pub fn snapshot(&self) -> Vec<Item> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| entry.item().cloned())
            .collect()
    }

    pub fn entries(&self) -> Vec<ArchiveEntry> {
        self.entries.lock().clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchiveStore {
    async fn load(&self) -> Result<Vec<ArchiveEntry>, StorageError> {
        Ok(self.entries())
    }

    async fn save(&self, entries: &[ArchiveEntry]) -> Result<(), StorageError> {
        *self.entries.lock() = entries.to_vec();
        *self.saves.lock() += 1;
        Ok(())
    }
}

//! drawgate storage
//!
//! A flat directory of uploaded drawings. Files are named after the
//! (normalized) client filename; a later upload with the same name replaces
//! the earlier one. There is no manifest, no sidecar metadata and no locking:
//! a listing taken while a write is in flight may report a partial size.
//!
//! All operations are blocking `std::fs` calls. Async callers should run them
//! on a blocking thread (`tokio::task::spawn_blocking`).
//!
//! ```rust
//! use storage::{StorageConfig, UploadStore};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = UploadStore::new(StorageConfig::new(dir.path().join("uploads")));
//! store.ensure_directory().unwrap();
//!
//! let stored = store.store("a.png", b"\x89PNG").unwrap();
//! assert_eq!(stored.size_bytes, 4);
//! assert_eq!(store.list().unwrap().len(), 1);
//! ```
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

mod config;
mod error;
mod filename;

pub use crate::config::StorageConfig;
pub use crate::error::StorageError;
pub use crate::filename::sanitize_filename;

/// A file present in the upload directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub filename: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    /// Last modification time, seconds since the Unix epoch.
    pub modified: f64,
}

impl StoredFile {
    fn from_metadata(filename: String, metadata: &fs::Metadata) -> Self {
        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0.0, |d| d.as_secs_f64());
        Self {
            filename,
            size_bytes: metadata.len(),
            modified,
        }
    }
}

/// Handle on the upload directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            root: config.upload_dir,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it does not exist yet.
    pub fn ensure_directory(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .map_err(|e| StorageError::io("create directory", &self.root, e))?;
        debug!(path = %self.root.display(), "upload directory ready");
        Ok(())
    }

    /// Path a client filename will be stored under.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(sanitize_filename(filename)?))
    }

    /// Write `bytes` under the normalized `filename`, replacing any existing file.
    ///
    /// A failure part-way through leaves whatever was written on disk.
    pub fn store(&self, filename: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        let name = sanitize_filename(filename)?;
        let path = self.root.join(&name);

        fs::write(&path, bytes).map_err(|e| StorageError::io("write", &path, e))?;
        let metadata = fs::metadata(&path).map_err(|e| StorageError::io("stat", &path, e))?;

        info!(
            filename = %name,
            path = %path.display(),
            size = metadata.len(),
            "stored upload"
        );
        Ok(StoredFile::from_metadata(name, &metadata))
    }

    /// Regular files directly under the upload root, in directory order.
    pub fn list(&self) -> Result<Vec<StoredFile>, StorageError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| StorageError::io("read directory", &self.root, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io("read directory", &self.root, e))?;
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                // Removed between readdir and stat.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::io("stat", entry.path(), e)),
            };
            if !metadata.is_file() {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().into_owned();
            files.push(StoredFile::from_metadata(filename, &metadata));
        }
        Ok(files)
    }
}

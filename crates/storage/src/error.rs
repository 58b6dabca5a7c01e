//! Error types for the upload store.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`UploadStore`](crate::UploadStore) operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The client filename normalizes to nothing usable.
    #[error("invalid filename '{0}'")]
    InvalidFilename(String),

    /// A filesystem operation failed.
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        StorageError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// True when the request itself is at fault rather than the filesystem.
    pub fn is_client_error(&self) -> bool {
        matches!(self, StorageError::InvalidFilename(_))
    }

    /// The underlying I/O error kind, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            StorageError::Io { source, .. } => Some(source.kind()),
            StorageError::InvalidFilename(_) => None,
        }
    }
}

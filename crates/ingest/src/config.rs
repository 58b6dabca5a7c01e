//! Configuration for upload validation.
//!
//! [`IngestConfig`] is cheap to clone and deserializes from the server's
//! configuration sources (TOML, YAML, JSON or environment variables).
//!
//! ```rust
//! use ingest::{IngestConfig, MAX_UPLOAD_BYTES};
//!
//! let config = IngestConfig::default();
//! assert_eq!(config.max_upload_bytes, MAX_UPLOAD_BYTES);
//! assert!(!config.sniff_content);
//! config.validate().expect("defaults are valid");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::formats::MAX_UPLOAD_BYTES;

/// Runtime configuration for upload validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Largest accepted file, in bytes. Files strictly larger are rejected.
    pub max_upload_bytes: usize,

    /// Compare the payload's leading bytes against the declared format.
    ///
    /// Off by default: the declared content type alone decides acceptance.
    pub sniff_content: bool,
}

/// Errors raised when an [`IngestConfig`] is unusable.
///
/// These surface at startup, not per request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("max_upload_bytes must be greater than zero")]
    ZeroUploadLimit,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            sniff_content: false,
        }
    }
}

impl IngestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ZeroUploadLimit);
        }
        Ok(())
    }
}

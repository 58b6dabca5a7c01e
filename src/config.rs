//! Gateway configuration shared by every transport adapter.
//!
//! ```toml
//! [gateway.ingest]
//! max_upload_bytes = 52428800
//! sniff_content = false
//!
//! [gateway.storage]
//! upload_dir = "uploads"
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ingest::{ConfigError, IngestConfig};
use storage::StorageConfig;

/// Errors raised by [`GatewayConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayConfigError {
    #[error("ingest: {0}")]
    Ingest(#[from] ConfigError),

    #[error("storage: upload_dir must not be empty")]
    EmptyUploadDir,
}

/// Validation rules plus the upload directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub ingest: IngestConfig,
    pub storage: StorageConfig,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), GatewayConfigError> {
        self.ingest.validate()?;
        if self.storage.upload_dir.as_os_str().is_empty() {
            return Err(GatewayConfigError::EmptyUploadDir);
        }
        Ok(())
    }
}

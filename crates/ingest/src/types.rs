//! Data model for a single upload and its validation outcome.
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One uploaded file as received by a transport adapter.
///
/// Lives only for the duration of a request. `bytes` is reference counted, so
/// cloning the request does not copy the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// MIME type as declared by the client for the file part.
    pub declared_content_type: String,
    /// Client-supplied filename, before any normalization.
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadRequest {
    pub fn new(
        declared_content_type: impl Into<String>,
        filename: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            declared_content_type: declared_content_type.into(),
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Why an upload was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationReason {
    Ok,
    UnsupportedType,
    TooLarge,
    ContentMismatch,
}

/// Outcome of [`validate`](crate::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub accepted: bool,
    pub reason: ValidationReason,
}

impl ValidationResult {
    pub const OK: ValidationResult = ValidationResult {
        accepted: true,
        reason: ValidationReason::Ok,
    };

    pub fn from_reason(reason: ValidationReason) -> Self {
        Self {
            accepted: matches!(reason, ValidationReason::Ok),
            reason,
        }
    }
}

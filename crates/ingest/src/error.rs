//! Error types produced by the ingest crate.
//!
//! Every rejection the validator can produce is a typed variant so callers can
//! map it to a transport status and a stable error code without string
//! matching.
//!
//! # Error Categories
//!
//! | Error | Description |
//! |-------|-------------|
//! | [`UnsupportedMediaType`](IngestError::UnsupportedMediaType) | Declared MIME type is not on the whitelist |
//! | [`PayloadTooLarge`](IngestError::PayloadTooLarge) | Byte length exceeds the upload limit |
//! | [`ContentMismatch`](IngestError::ContentMismatch) | Leading bytes do not match the declared format (sniffing only) |
//!
//! # HTTP Status Code Mapping
//!
//! Upload rejections are reported as `400 Bad Request`, including oversize
//! files. A `413` is reserved for bodies the transport refuses to buffer.
//!
//! ```rust
//! use ingest::IngestError;
//!
//! let err = IngestError::PayloadTooLarge { size: 60 * 1024 * 1024, limit: 50 * 1024 * 1024 };
//! assert_eq!(err.http_status_code(), 400);
//! assert_eq!(err.code(), "PAYLOAD_TOO_LARGE");
//! ```
use thiserror::Error;

use crate::formats::SUPPORTED_CONTENT_TYPES;

/// Errors that can occur while validating an upload.
///
/// All variants describe a problem with the client's request. The enum is
/// `#[non_exhaustive]`; callers should keep a catch-all arm.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// The declared content type is not one of [`SUPPORTED_CONTENT_TYPES`].
    ///
    /// ```rust
    /// use ingest::IngestError;
    ///
    /// let err = IngestError::UnsupportedMediaType { content_type: "text/plain".into() };
    /// assert!(err.to_string().starts_with("unsupported file type 'text/plain'"));
    /// ```
    #[error(
        "unsupported file type '{content_type}'; supported types: {}",
        SUPPORTED_CONTENT_TYPES.join(", ")
    )]
    UnsupportedMediaType { content_type: String },

    /// The payload is larger than the configured limit.
    ///
    /// `size` is the number of bytes observed when the limit was crossed. An
    /// adapter that stops reading early reports a lower bound, not the full
    /// length of the client's file.
    #[error("file size exceeds the {}MB limit ({size} bytes > {limit} bytes)", .limit / (1024 * 1024))]
    PayloadTooLarge { size: usize, limit: usize },

    /// The leading bytes contradict the declared type.
    ///
    /// Only produced when [`IngestConfig::sniff_content`](crate::IngestConfig::sniff_content)
    /// is enabled.
    #[error("file content does not match declared type '{declared}' (detected {detected})")]
    ContentMismatch { declared: String, detected: String },
}

impl IngestError {
    /// Returns true if this error indicates a client-side issue.
    ///
    /// Every validation failure is caused by the request, so this is always
    /// true. It mirrors the method of the same name on other error types.
    pub fn is_client_error(&self) -> bool {
        true
    }

    /// Suggested HTTP status code. All validator rejections are `400`.
    pub fn http_status_code(&self) -> u16 {
        400
    }

    /// Stable machine-readable code used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            IngestError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            IngestError::ContentMismatch { .. } => "CONTENT_MISMATCH",
        }
    }
}

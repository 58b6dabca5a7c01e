//! drawgate ingest layer
//!
//! Every upload passes through here before it touches the disk. We check the
//! client's declared content type against a fixed whitelist and the byte
//! length against a fixed ceiling, and report exactly which rule failed.
//!
//! ## What we do here
//!
//! - **Whitelist the declared type** - `image/png`, `image/jpeg`, `image/jpg`
//!   and `application/pdf`. Nothing else gets through.
//! - **Cap the size** - 50 MiB by default; anything strictly larger is rejected.
//! - **Optionally sniff** - with [`IngestConfig::sniff_content`] on, the first
//!   bytes must match the declared format. Off by default; the declared type
//!   is otherwise trusted as-is.
//! - **Log outcomes** - structured `tracing` events for every decision.
//!
//! The checks are pure functions of their inputs. Nothing here reads or writes
//! files.
//!
//! ## Example
//!
//! ```
//! use ingest::{check_upload, validate, IngestConfig, UploadRequest, ValidationReason};
//!
//! let config = IngestConfig::default();
//!
//! let verdict = validate("text/plain", 10, &config);
//! assert!(!verdict.accepted);
//! assert_eq!(verdict.reason, ValidationReason::UnsupportedType);
//!
//! let request = UploadRequest::new("image/png", "plan.png", vec![0u8; 10_240]);
//! let format = check_upload(&request, &config).unwrap();
//! assert_eq!(format.extension(), "png");
//! ```
use tracing::{debug, warn};

mod config;
mod error;
mod formats;
mod types;

pub use crate::config::{ConfigError, IngestConfig};
pub use crate::error::IngestError;
pub use crate::formats::{DrawingFormat, MAX_UPLOAD_BYTES, SUPPORTED_CONTENT_TYPES};
pub use crate::types::{UploadRequest, ValidationReason, ValidationResult};

/// Validate a declared type and byte length without raising an error.
///
/// The type rule is evaluated first, so an unsupported type is reported as
/// such regardless of the size.
pub fn validate(content_type: &str, byte_length: usize, cfg: &IngestConfig) -> ValidationResult {
    let outcome = check_content_type(content_type).and_then(|_| check_size(byte_length, cfg));
    match outcome {
        Ok(()) => ValidationResult::OK,
        Err(err) => ValidationResult::from_reason(reason_for(&err)),
    }
}

/// Resolve a declared content type against the whitelist.
pub fn check_content_type(content_type: &str) -> Result<DrawingFormat, IngestError> {
    DrawingFormat::from_content_type(content_type).ok_or_else(|| {
        IngestError::UnsupportedMediaType {
            content_type: content_type.to_string(),
        }
    })
}

/// Enforce the upload size limit.
///
/// Adapters that stream a body can call this with the running total to stop
/// reading as soon as the limit is crossed.
pub fn check_size(byte_length: usize, cfg: &IngestConfig) -> Result<(), IngestError> {
    if byte_length > cfg.max_upload_bytes {
        return Err(IngestError::PayloadTooLarge {
            size: byte_length,
            limit: cfg.max_upload_bytes,
        });
    }
    Ok(())
}

/// Run the full rule chain over a buffered upload.
///
/// Returns the resolved [`DrawingFormat`] on success.
pub fn check_upload(
    request: &UploadRequest,
    cfg: &IngestConfig,
) -> Result<DrawingFormat, IngestError> {
    let result = check_upload_inner(request, cfg);
    match &result {
        Ok(format) => debug!(
            filename = %request.filename,
            content_type = %request.declared_content_type,
            size = request.len(),
            format = %format,
            "upload_accepted"
        ),
        Err(err) => warn!(
            filename = %request.filename,
            content_type = %request.declared_content_type,
            size = request.len(),
            error = %err,
            "upload_rejected"
        ),
    }
    result
}

fn check_upload_inner(
    request: &UploadRequest,
    cfg: &IngestConfig,
) -> Result<DrawingFormat, IngestError> {
    let format = check_content_type(&request.declared_content_type)?;
    check_size(request.len(), cfg)?;

    if cfg.sniff_content {
        let detected = DrawingFormat::sniff(&request.bytes);
        if detected != Some(format) {
            return Err(IngestError::ContentMismatch {
                declared: request.declared_content_type.clone(),
                detected: detected
                    .map_or("unknown", DrawingFormat::mime_type)
                    .to_string(),
            });
        }
    }

    Ok(format)
}

fn reason_for(err: &IngestError) -> ValidationReason {
    match err {
        IngestError::UnsupportedMediaType { .. } => ValidationReason::UnsupportedType,
        IngestError::PayloadTooLarge { .. } => ValidationReason::TooLarge,
        IngestError::ContentMismatch { .. } => ValidationReason::ContentMismatch,
    }
}

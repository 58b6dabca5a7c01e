//! Workspace umbrella crate for drawgate, the drawing upload gateway.
//!
//! This crate stitches the validator ([`ingest`]) and the upload directory
//! ([`storage`]) into the single contract every transport adapter calls:
//! [`accept_upload`] validates a buffered upload and, only if it passes,
//! writes it to disk.

pub mod config;

pub use config::{GatewayConfig, GatewayConfigError};
pub use ingest::{
    check_content_type, check_size, check_upload, validate, ConfigError, DrawingFormat,
    IngestConfig, IngestError, UploadRequest, ValidationReason, ValidationResult,
    MAX_UPLOAD_BYTES, SUPPORTED_CONTENT_TYPES,
};
pub use storage::{sanitize_filename, StorageConfig, StorageError, StoredFile, UploadStore};

use std::path::PathBuf;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

/// Errors that can occur while accepting an upload.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GatewayError {
    /// True when the client's request caused the failure.
    pub fn is_client_error(&self) -> bool {
        match self {
            GatewayError::Ingest(err) => err.is_client_error(),
            GatewayError::Storage(err) => err.is_client_error(),
        }
    }
}

/// A validated upload that has been written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedUpload {
    pub stored: StoredFile,
    pub format: DrawingFormat,
    /// Content type exactly as the client declared it.
    pub content_type: String,
    pub path: PathBuf,
}

/// Metrics observer for upload outcomes.
pub trait UploadMetrics: Send + Sync {
    fn record_validation(&self, latency: Duration, result: Result<DrawingFormat, &IngestError>);
    fn record_store(&self, latency: Duration, bytes: usize, result: Result<(), &StorageError>);
}

/// Install or clear the global upload metrics recorder.
pub fn set_upload_metrics(recorder: Option<Arc<dyn UploadMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn UploadMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn UploadMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn UploadMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn UploadMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_validation(self, result: Result<DrawingFormat, &IngestError>) {
        self.recorder
            .record_validation(self.start.elapsed(), result);
    }

    fn record_store(self, bytes: usize, result: Result<(), &StorageError>) {
        self.recorder
            .record_store(self.start.elapsed(), bytes, result);
    }
}

/// Report a rejection raised by an early [`check_content_type`] or
/// [`check_size`] call, before the full upload reached [`accept_upload`].
pub fn record_rejection(err: &IngestError) {
    if let Some(span) = MetricsSpan::start() {
        span.record_validation(Err(err));
    }
}

/// Validate `request` and persist it under its normalized filename.
///
/// Nothing is written unless every validation rule passes. A storage failure
/// after validation is returned as [`GatewayError::Storage`]; partially
/// written files are left in place.
pub fn accept_upload(
    request: &UploadRequest,
    ingest_cfg: &IngestConfig,
    store: &UploadStore,
) -> Result<AcceptedUpload, GatewayError> {
    let validation_metrics = MetricsSpan::start();
    let format = match check_upload(request, ingest_cfg) {
        Ok(format) => {
            if let Some(span) = validation_metrics {
                span.record_validation(Ok(format));
            }
            format
        }
        Err(err) => {
            if let Some(span) = validation_metrics {
                span.record_validation(Err(&err));
            }
            return Err(GatewayError::Ingest(err));
        }
    };

    let store_metrics = MetricsSpan::start();
    let stored = match store.store(&request.filename, &request.bytes) {
        Ok(stored) => {
            if let Some(span) = store_metrics {
                span.record_store(request.len(), Ok(()));
            }
            stored
        }
        Err(err) => {
            if let Some(span) = store_metrics {
                span.record_store(request.len(), Err(&err));
            }
            return Err(GatewayError::Storage(err));
        }
    };

    let path = store.path_for(&stored.filename)?;
    Ok(AcceptedUpload {
        stored,
        format,
        content_type: request.declared_content_type.clone(),
        path,
    })
}

/// List everything currently in the upload directory.
pub fn list_uploads(store: &UploadStore) -> Result<Vec<StoredFile>, GatewayError> {
    Ok(store.list()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that swap the global recorder.
    static RECORDER: Mutex<()> = Mutex::new(());

    fn temp_store() -> (tempfile::TempDir, UploadStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = UploadStore::new(StorageConfig::new(dir.path()));
        (dir, store)
    }

    #[test]
    fn accepted_upload_reports_path_and_format() {
        let (dir, store) = temp_store();
        let request = UploadRequest::new("image/jpg", "site.jpg", vec![0xFFu8; 2048]);

        let accepted = accept_upload(&request, &IngestConfig::default(), &store).unwrap();
        assert_eq!(accepted.format, DrawingFormat::Jpeg);
        assert_eq!(accepted.content_type, "image/jpg");
        assert_eq!(accepted.stored.size_bytes, 2048);
        assert_eq!(accepted.path, dir.path().join("site.jpg"));
    }

    #[test]
    fn rejected_upload_writes_nothing() {
        let (_dir, store) = temp_store();
        let request = UploadRequest::new("text/plain", "notes.txt", b"hello".to_vec());

        let err = accept_upload(&request, &IngestConfig::default(), &store).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Ingest(IngestError::UnsupportedMediaType { .. })
        ));
        assert!(err.is_client_error());
        assert!(list_uploads(&store).unwrap().is_empty());
    }

    #[derive(Default)]
    struct CountingMetrics {
        events: Mutex<Vec<&'static str>>,
    }

    impl UploadMetrics for CountingMetrics {
        fn record_validation(
            &self,
            _latency: Duration,
            result: Result<DrawingFormat, &IngestError>,
        ) {
            let label = if result.is_ok() {
                "validation_ok"
            } else {
                "validation_err"
            };
            self.events.lock().unwrap().push(label);
        }

        fn record_store(
            &self,
            _latency: Duration,
            _bytes: usize,
            result: Result<(), &StorageError>,
        ) {
            let label = if result.is_ok() {
                "store_ok"
            } else {
                "store_err"
            };
            self.events.lock().unwrap().push(label);
        }
    }

    #[test]
    fn metrics_recorder_tracks_upload_outcome() {
        let _guard = RECORDER.lock().unwrap_or_else(|p| p.into_inner());
        let metrics = Arc::new(CountingMetrics::default());
        set_upload_metrics(Some(metrics.clone()));

        let (_dir, store) = temp_store();
        let ok = UploadRequest::new("application/pdf", "a.pdf", b"%PDF-1.4".to_vec());
        let bad = UploadRequest::new("image/gif", "a.gif", b"GIF89a".to_vec());
        accept_upload(&ok, &IngestConfig::default(), &store).unwrap();
        accept_upload(&bad, &IngestConfig::default(), &store).unwrap_err();

        set_upload_metrics(None);

        let events = metrics.events.lock().unwrap().clone();
        assert!(events.contains(&"validation_ok"));
        assert!(events.contains(&"store_ok"));
        assert!(events.contains(&"validation_err"));
    }

    #[test]
    fn early_rejection_reaches_recorder() {
        let _guard = RECORDER.lock().unwrap_or_else(|p| p.into_inner());
        let metrics = Arc::new(CountingMetrics::default());
        set_upload_metrics(Some(metrics.clone()));

        let err = check_content_type("text/plain").unwrap_err();
        record_rejection(&err);

        set_upload_metrics(None);

        let events = metrics.events.lock().unwrap().clone();
        assert!(events.contains(&"validation_err"));
        assert!(!events.contains(&"store_ok"));
    }
}

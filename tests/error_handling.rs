use drawgate::{
    accept_upload, list_uploads, validate, GatewayError, IngestConfig, IngestError, StorageConfig,
    StorageError, UploadRequest, UploadStore, ValidationReason,
};

fn store_in(dir: &std::path::Path) -> UploadStore {
    UploadStore::new(StorageConfig::new(dir))
}

#[test]
fn unsupported_type_wins_over_size() {
    let result = validate("image/gif", 60 * 1024 * 1024, &IngestConfig::default());
    assert!(!result.accepted);
    assert_eq!(result.reason, ValidationReason::UnsupportedType);
}

#[test]
fn oversize_is_rejected_for_every_supported_type() {
    for content_type in drawgate::SUPPORTED_CONTENT_TYPES {
        let result = validate(
            content_type,
            drawgate::MAX_UPLOAD_BYTES + 1,
            &IngestConfig::default(),
        );
        assert_eq!(result.reason, ValidationReason::TooLarge, "{content_type}");
    }
}

#[test]
fn oversize_upload_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    let cfg = IngestConfig {
        max_upload_bytes: 16,
        ..IngestConfig::default()
    };
    let request = UploadRequest::new("image/png", "a.png", vec![0u8; 17]);

    let err = accept_upload(&request, &cfg, &store).unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Ingest(IngestError::PayloadTooLarge { size: 17, limit: 16 })
    ));
    assert!(list_uploads(&store).unwrap().is_empty());
}

#[test]
fn sniffing_rejects_mislabelled_content() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    let cfg = IngestConfig {
        sniff_content: true,
        ..IngestConfig::default()
    };
    let request = UploadRequest::new("application/pdf", "plan.pdf", b"\x89PNG\r\n\x1a\nrest".to_vec());

    let err = accept_upload(&request, &cfg, &store).unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Ingest(IngestError::ContentMismatch { .. })
    ));
    assert!(err.is_client_error());
}

#[test]
fn empty_filename_is_a_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    let request = UploadRequest::new("image/png", "   ", b"png".to_vec());

    let err = accept_upload(&request, &IngestConfig::default(), &store).unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Storage(StorageError::InvalidFilename(_))
    ));
    assert!(err.is_client_error());
}

#[test]
fn missing_directory_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir.path().join("not-created"));
    let request = UploadRequest::new("image/png", "a.png", b"png".to_vec());

    let err = accept_upload(&request, &IngestConfig::default(), &store).unwrap_err();
    assert!(matches!(err, GatewayError::Storage(StorageError::Io { .. })));
    assert!(!err.is_client_error());
}

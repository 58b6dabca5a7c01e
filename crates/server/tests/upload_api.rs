//! HTTP tests for the axum routes.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;

#[tokio::test]
async fn small_png_is_stored() {
    let (dir, app) = test_app();
    let data = vec![0x89u8; 10 * 1024];

    let response = send(
        &app,
        upload_request("/upload", &[Part::file("a.png", "image/png", &data)]),
    )
    .await;
    let (status, body) = json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "a.png");
    assert_eq!(body["file_size"], 10240);
    assert_eq!(body["content_type"], "image/png");
    assert_eq!(body["status"], "uploaded");
    assert_eq!(
        body["file_path"],
        dir.path().join("a.png").display().to_string()
    );
    assert_eq!(std::fs::read(dir.path().join("a.png")).unwrap(), data);
}

#[tokio::test]
async fn text_file_is_rejected_as_unsupported() {
    let (dir, app) = test_app();

    let response = send(
        &app,
        upload_request("/upload", &[Part::file("notes.txt", "text/plain", b"hello")]),
    )
    .await;
    let (status, body) = json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(!dir.path().join("notes.txt").exists());
}

#[tokio::test]
async fn oversize_png_is_rejected_by_validator() {
    let (dir, app) = test_app();
    let data = vec![0u8; 60 * 1024 * 1024];

    let response = send(
        &app,
        upload_request("/upload", &[Part::file("huge.png", "image/png", &data)]),
    )
    .await;
    let (status, body) = json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("50MB"));
    assert!(!dir.path().join("huge.png").exists());
}

#[tokio::test]
async fn body_over_transport_limit_is_413() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.max_body_size_mb = 1;
    config.gateway.ingest.max_upload_bytes = 8 * 1024 * 1024;
    let app = test_app_with(config);
    let data = vec![0u8; 2 * 1024 * 1024];

    let response = send(
        &app,
        upload_request("/upload", &[Part::file("big.pdf", "application/pdf", &data)]),
    )
    .await;
    let (status, body) = json(response).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "BODY_TOO_LARGE");
}

#[tokio::test]
async fn non_multipart_body_is_rejected() {
    let (_dir, app) = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file":"a.png"}"#))
        .unwrap();
    let (status, body) = json(send(&app, request).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_CONTENT_TYPE");
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let (_dir, app) = test_app();

    let response = send(
        &app,
        upload_request("/upload", &[Part::text("comment", "no drawing today")]),
    )
    .await;
    let (status, body) = json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_FILE");
    assert_eq!(body["error"]["message"], "no file provided");
}

#[tokio::test]
async fn empty_filename_is_rejected() {
    let (_dir, app) = test_app();

    let response = send(
        &app,
        upload_request("/upload", &[Part::file("", "image/png", b"\x89PNG")]),
    )
    .await;
    let (status, body) = json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "no file selected");
}

#[tokio::test]
async fn other_fields_before_file_are_ignored() {
    let (_dir, app) = test_app();

    let response = send(
        &app,
        upload_request(
            "/upload",
            &[
                Part::text("project", "bridge"),
                Part::file("plan.pdf", "application/pdf", b"%PDF-1.7"),
            ],
        ),
    )
    .await;
    let (status, body) = json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "plan.pdf");
    assert_eq!(body["file_size"], 8);
}

#[tokio::test]
async fn path_components_are_stripped_from_filename() {
    let (dir, app) = test_app();

    let response = send(
        &app,
        upload_request(
            "/upload",
            &[Part::file("../../etc/passwd.png", "image/png", b"png")],
        ),
    )
    .await;
    let (status, body) = json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "passwd.png");
    assert!(dir.path().join("passwd.png").exists());
}

#[tokio::test]
async fn dot_dot_filename_is_invalid() {
    let (_dir, app) = test_app();

    let response = send(
        &app,
        upload_request("/upload", &[Part::file("..", "image/png", b"png")]),
    )
    .await;
    let (status, body) = json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_FILENAME");
}

#[tokio::test]
async fn second_upload_overwrites_first() {
    let (_dir, app) = test_app();

    for size in [4096usize, 1024] {
        let data = vec![0xFFu8; size];
        let response = send(
            &app,
            upload_request("/upload", &[Part::file("site.jpg", "image/jpeg", &data)]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let (status, body) = json(send(&app, get("/files")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["files"][0]["filename"], "site.jpg");
    assert_eq!(body["files"][0]["size"], 1024);
}

#[tokio::test]
async fn listing_reports_uploaded_files() {
    let (_dir, app) = test_app();

    let (status, body) = json(send(&app, get("/files")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    send(
        &app,
        upload_request("/upload", &[Part::file("a.png", "image/png", &[1u8; 300])]),
    )
    .await;
    send(
        &app,
        upload_request("/upload", &[Part::file("b.pdf", "application/pdf", &[2u8; 700])]),
    )
    .await;

    let (_, body) = json(send(&app, get("/files")).await).await;
    assert_eq!(body["count"], 2);
    let mut files: Vec<(String, u64)> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            assert!(f["modified"].as_f64().unwrap() > 0.0);
            (
                f["filename"].as_str().unwrap().to_string(),
                f["size"].as_u64().unwrap(),
            )
        })
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec![("a.png".to_string(), 300), ("b.pdf".to_string(), 700)]
    );
}

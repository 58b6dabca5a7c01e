//! API route handlers
//!
//! - `health`: liveness and Prometheus metrics
//! - `upload`: multipart drawing upload
//! - `files`: upload directory listing

pub mod files;
pub mod health;
pub mod upload;

use crate::error::ServerError;
use axum::Json;
use drawgate::AcceptedUpload;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SERVICE_NAME: &str = "drawgate";

/// Body of `GET /` and `GET /api`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub status: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

impl ApiInfo {
    /// Describe the endpoints mounted under `prefix` (empty for the root router)
    pub fn new(prefix: &str) -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert("upload".to_string(), format!("{prefix}/upload"));
        endpoints.insert("health".to_string(), format!("{prefix}/health"));
        if prefix.is_empty() {
            endpoints.insert("files".to_string(), "/files".to_string());
            endpoints.insert("metrics".to_string(), "/metrics".to_string());
        }

        Self {
            message: format!("drawgate drawing upload API v{}", env!("CARGO_PKG_VERSION")),
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            endpoints,
        }
    }
}

/// Body of a successful upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub file_size: u64,
    pub content_type: String,
    pub file_path: String,
    pub status: String,
}

impl From<AcceptedUpload> for UploadResponse {
    fn from(accepted: AcceptedUpload) -> Self {
        Self {
            message: "File uploaded successfully".to_string(),
            filename: accepted.stored.filename,
            file_size: accepted.stored.size_bytes,
            content_type: accepted.content_type,
            file_path: accepted.path.display().to_string(),
            status: "uploaded".to_string(),
        }
    }
}

/// API version and base info
///
/// ```json
/// {
///   "message": "drawgate drawing upload API v0.1.0",
///   "status": "healthy",
///   "version": "0.1.0",
///   "endpoints": { "upload": "/upload", "health": "/health", "...": "..." }
/// }
/// ```
pub async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo::new(""))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

/// 405 for a known path hit with the wrong method
pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

//! Framework-free request handler.
//!
//! [`RawHandler`] serves the `/api` paths the browser frontend calls. It works
//! on plain `http` types with a fully buffered body and parses multipart with
//! `multer`, so it can sit behind any transport. It shares the upload
//! contract, error bodies and CORS policy with the axum routes, and answers
//! HEAD on its GET endpoints the way axum does.

use crate::config::{CorsConfig, ServerConfig};
use crate::cors;
use crate::error::ServerError;
use crate::routes::health::HealthStatus;
use crate::routes::upload::{DEFAULT_PART_CONTENT_TYPE, FILE_FIELD};
use crate::routes::{ApiInfo, UploadResponse};
use bytes::Bytes;
use drawgate::{IngestConfig, UploadRequest, UploadStore};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;

/// Path prefix the raw handler is mounted under
pub const API_PREFIX: &str = "/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Root,
    Health,
    Upload,
}

impl Endpoint {
    fn resolve(path: &str) -> Option<Self> {
        let rest = path.strip_prefix(API_PREFIX)?;
        match rest.trim_end_matches('/') {
            "" => Some(Endpoint::Root),
            "/health" => Some(Endpoint::Health),
            "/upload" => Some(Endpoint::Upload),
            _ => None,
        }
    }

    fn method(self) -> Method {
        match self {
            Endpoint::Root | Endpoint::Health => Method::GET,
            Endpoint::Upload => Method::POST,
        }
    }

    /// HEAD is served wherever GET is
    fn allows(self, method: &Method) -> bool {
        let expected = self.method();
        *method == expected || (expected == Method::GET && *method == Method::HEAD)
    }
}

/// Handles `/api`, `/api/health` and `/api/upload`
#[derive(Debug, Clone)]
pub struct RawHandler {
    cors: CorsConfig,
    ingest: IngestConfig,
    store: Arc<UploadStore>,
    body_limit_mb: usize,
}

impl RawHandler {
    pub fn new(config: &ServerConfig, store: Arc<UploadStore>) -> Self {
        Self {
            cors: config.cors.clone(),
            ingest: config.gateway.ingest.clone(),
            store,
            body_limit_mb: config.max_body_size_mb,
        }
    }

    /// Transport body limit, reported when a request exceeds it
    pub fn body_limit_mb(&self) -> usize {
        self.body_limit_mb
    }

    pub async fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let Some(endpoint) = Endpoint::resolve(request.uri().path()) else {
            return self.error_response(request.headers(), &ServerError::NotFound);
        };

        if request.method() == Method::OPTIONS {
            return self.preflight(request.headers());
        }
        if !endpoint.allows(request.method()) {
            return self.error_response(request.headers(), &ServerError::MethodNotAllowed);
        }

        let result = match endpoint {
            Endpoint::Root => Ok(self.json(StatusCode::OK, &ApiInfo::new(API_PREFIX))),
            Endpoint::Health => Ok(self.json(StatusCode::OK, &HealthStatus::current())),
            Endpoint::Upload => self
                .upload(&request)
                .await
                .map(|body| self.json(StatusCode::OK, &body)),
        };

        match result {
            Ok(mut response) => {
                cors::write_headers(&self.cors, request.headers(), false, response.headers_mut());
                if request.method() == Method::HEAD {
                    *response.body_mut() = Bytes::new();
                }
                response
            }
            Err(err) => self.error_response(request.headers(), &err),
        }
    }

    /// Render `err` with the same body the axum routes produce
    pub fn error_response(&self, request_headers: &HeaderMap, err: &ServerError) -> Response<Bytes> {
        let status = err.status_code();
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        let mut response = self.json(status, &err.body());
        cors::write_headers(&self.cors, request_headers, false, response.headers_mut());
        response
    }

    fn preflight(&self, request_headers: &HeaderMap) -> Response<Bytes> {
        let mut response = Response::new(Bytes::new());
        cors::write_headers(&self.cors, request_headers, true, response.headers_mut());
        response
    }

    fn json<T: Serialize>(&self, status: StatusCode, body: &T) -> Response<Bytes> {
        let (status, body) = match serde_json::to_vec(body) {
            Ok(bytes) => (status, Bytes::from(bytes)),
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Bytes::from_static(br#"{"error":{"code":"INTERNAL_ERROR","message":"serialization failed"}}"#),
                )
            }
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    async fn upload(&self, request: &Request<Bytes>) -> Result<UploadResponse, ServerError> {
        let declared = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let boundary = multer::parse_boundary(declared)
            .map_err(|_| ServerError::NotMultipart(declared.to_string()))?;

        let body = request.body().clone();
        let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let upload = loop {
            let Some(field) = multipart.next_field().await.map_err(malformed)? else {
                return Err(ServerError::MissingFile("no file provided"));
            };
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let filename = match field.file_name() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => return Err(ServerError::MissingFile("no file selected")),
            };
            let content_type = field
                .content_type()
                .map_or_else(|| DEFAULT_PART_CONTENT_TYPE.to_string(), |mime| mime.to_string());
            let bytes = field.bytes().await.map_err(malformed)?;

            break UploadRequest::new(content_type, filename, bytes);
        };

        let store = self.store.clone();
        let ingest = self.ingest.clone();
        let accepted =
            tokio::task::spawn_blocking(move || drawgate::accept_upload(&upload, &ingest, &store))
                .await??;

        tracing::info!(
            filename = %accepted.stored.filename,
            size = accepted.stored.size_bytes,
            format = %accepted.format,
            "upload stored"
        );
        Ok(UploadResponse::from(accepted))
    }
}

fn malformed(err: multer::Error) -> ServerError {
    ServerError::MalformedMultipart(err.to_string())
}

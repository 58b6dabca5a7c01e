use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use drawgate::{GatewayError, IngestError, StorageError};
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("unsupported request content type '{0}': expected multipart/form-data")]
    NotMultipart(String),

    #[error("malformed multipart body: {0}")]
    MalformedMultipart(String),

    #[error("{0}")]
    MissingFile(&'static str),

    #[error("request body exceeds the {0}MB limit")]
    BodyTooLarge(usize),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("Request timeout")]
    Timeout,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotMultipart(_)
            | ServerError::MalformedMultipart(_)
            | ServerError::MissingFile(_)
            | ServerError::Ingest(_) => StatusCode::BAD_REQUEST,
            ServerError::Storage(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Storage(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::NotMultipart(_) => "INVALID_CONTENT_TYPE",
            ServerError::MalformedMultipart(_) => "MALFORMED_MULTIPART",
            ServerError::MissingFile(_) => "MISSING_FILE",
            ServerError::BodyTooLarge(_) => "BODY_TOO_LARGE",
            ServerError::Ingest(err) => err.code(),
            ServerError::Storage(StorageError::InvalidFilename(_)) => "INVALID_FILENAME",
            ServerError::Storage(_) => "STORAGE_ERROR",
            ServerError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ServerError::Timeout => "REQUEST_TIMEOUT",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }

    /// Response body shared by the axum and raw adapters
    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<GatewayError> for ServerError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Ingest(err) => ServerError::Ingest(err),
            GatewayError::Storage(err) => ServerError::Storage(err),
        }
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("storage task failed: {err}"))
    }
}

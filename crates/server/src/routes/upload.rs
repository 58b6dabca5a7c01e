use crate::error::{ServerError, ServerResult};
use crate::routes::UploadResponse;
use crate::state::ServerState;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use bytes::BytesMut;
use drawgate::{check_content_type, check_size, IngestError, UploadRequest};
use std::sync::Arc;

/// Multipart field carrying the drawing
pub const FILE_FIELD: &str = "file";

/// Content type assumed when the file part declares none
pub const DEFAULT_PART_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload a single drawing
///
/// Expects `multipart/form-data` with the drawing in the `file` field. The
/// declared type is checked before the part is read, and reading stops as
/// soon as the running size crosses the upload limit.
pub async fn upload_file(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|_| {
        let declared = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        ServerError::NotMultipart(declared.to_string())
    })?;

    let request = read_file_field(&state, &mut multipart).await?;

    tracing::debug!(
        filename = %request.filename,
        content_type = %request.declared_content_type,
        size = request.len(),
        "upload received"
    );

    let store = state.store.clone();
    let ingest = state.ingest().clone();
    let accepted =
        tokio::task::spawn_blocking(move || drawgate::accept_upload(&request, &ingest, &store))
            .await??;

    tracing::info!(
        filename = %accepted.stored.filename,
        size = accepted.stored.size_bytes,
        format = %accepted.format,
        "upload stored"
    );

    Ok(Json(UploadResponse::from(accepted)))
}

/// Pull the first `file` field out of the body, skipping every other field
async fn read_file_field(
    state: &ServerState,
    multipart: &mut Multipart,
) -> ServerResult<UploadRequest> {
    let limit = state.config.max_body_size_mb;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ServerError::MissingFile("no file selected")),
        };
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_PART_CONTENT_TYPE)
            .to_string();

        check_content_type(&content_type)
            .map_err(|err| rejected(&filename, &content_type, err))?;

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, limit))?
        {
            check_size(buffer.len() + chunk.len(), state.ingest())
                .map_err(|err| rejected(&filename, &content_type, err))?;
            buffer.extend_from_slice(&chunk);
        }

        return Ok(UploadRequest::new(content_type, filename, buffer.freeze()));
    }

    Err(ServerError::MissingFile("no file provided"))
}

/// Report a rejection caught while streaming, before `accept_upload` runs
fn rejected(filename: &str, content_type: &str, err: IngestError) -> ServerError {
    drawgate::record_rejection(&err);
    tracing::warn!(
        filename = %filename,
        content_type = %content_type,
        error = %err,
        "upload_rejected"
    );
    ServerError::Ingest(err)
}

fn multipart_error(err: MultipartError, limit_mb: usize) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::BodyTooLarge(limit_mb)
    } else {
        ServerError::MalformedMultipart(err.body_text())
    }
}

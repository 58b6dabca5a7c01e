use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use drawgate::StoredFile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<StoredFile>,
    pub count: usize,
}

/// List uploaded files
///
/// Entries are returned in directory order. A file still being written may
/// appear with its partial size.
pub async fn list_files(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<FileListResponse>> {
    let store = state.store.clone();
    let files = tokio::task::spawn_blocking(move || drawgate::list_uploads(&store)).await??;

    Ok(Json(FileListResponse {
        count: files.len(),
        files,
    }))
}

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppPath;
use crate::files::{check_content_type, resolve_content_type, StoredFile};
use crate::response::{ApiResponse, Created};
use crate::state::AppState;

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// POST /api/files
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Created<StoredFile>, AppError> {
    state.simulate_latency().await;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "upload".to_string());
        let content_type =
            resolve_content_type(field.content_type(), &file_name).ok_or_else(|| {
                AppError::UnsupportedMediaType(format!(
                    "Cannot determine the type of '{file_name}'"
                ))
            })?;
        // Reject before buffering the body
        check_content_type(&content_type)?;

        let bytes = field.bytes().await?;
        let stored = state.files.save(&file_name, &content_type, bytes).await?;
        return Ok(Created(ApiResponse::with_message(stored, "File uploaded")));
    }

    Err(AppError::Validation(format!(
        "Multipart field '{FILE_FIELD}' is required"
    )))
}

/// GET /api/files
pub async fn handle_list_files(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<StoredFile>>, AppError> {
    state.simulate_latency().await;
    Ok(ApiResponse::ok(state.files.list().await))
}

/// GET /api/files/:id
pub async fn handle_download(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.simulate_latency().await;
    let (meta, bytes) = state.files.read(id).await?;
    let disposition = format!("inline; filename=\"{}\"", meta.file_name.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, meta.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// DELETE /api/files/:id
pub async fn handle_delete_file(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<StoredFile>, AppError> {
    state.simulate_latency().await;
    let removed = state.files.delete(id).await?;
    Ok(ApiResponse::with_message(removed, "File deleted"))
}

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::drive::DriveClient;
use crate::error::{AppError, DriveError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/drive/upload", post(drive_upload))
}

#[derive(Deserialize)]
struct DriveUploadRequest {
    file_id: String,
    folder_name: Option<String>,
}

#[derive(Serialize)]
struct DriveUploadResponse {
    drive_file_id: String,
    web_view_link: Option<String>,
    folder_id: String,
}

/// Uploads the original FIT bytes of a cached workout to Google Drive.
async fn drive_upload(
    State(state): State<AppState>,
    Json(req): Json<DriveUploadRequest>,
) -> Result<Json<DriveUploadResponse>, AppError> {
    let stored = state
        .get(&req.file_id)
        .ok_or_else(|| AppError::NotFound(req.file_id.clone()))?;

    let credentials = state
        .config()
        .drive_credentials_file
        .clone()
        .ok_or(DriveError::NotConfigured)?;
    let client = DriveClient::from_credentials_file(&credentials)?;

    let folder_name = req
        .folder_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| state.config().drive_folder.clone());

    tracing::info!(
        "Uploading {} to Drive folder '{}'",
        stored.filename,
        folder_name
    );

    let uploaded = client
        .upload_fit_file(&folder_name, &stored.filename, stored.raw.clone())
        .await?;

    tracing::info!(
        "Uploaded {} as Drive file {}",
        stored.filename,
        uploaded.file_id
    );

    Ok(Json(DriveUploadResponse {
        drive_file_id: uploaded.file_id,
        web_view_link: uploaded.web_view_link,
        folder_id: uploaded.folder_id,
    }))
}
